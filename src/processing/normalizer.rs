//! Text normalization for resumes and job descriptions
//!
//! Cleans decoded text into a canonical form before segmentation and
//! matching. `clean` is pure and idempotent; `clean_for_embedding` is a more
//! aggressive variant that strips contact noise and header-only lines so the
//! remaining text carries mostly semantic content.

use regex::Regex;

const BULLET_GLYPHS: &[char] = &[
    '•', '●', '○', '■', '□', '▪', '▫', '►', '▸', '‣', '⁃', '◆', '◇', '★', '☆',
];

pub struct TextNormalizer {
    url_regex: Regex,
    www_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
    caps_header_regex: Regex,
    text_bullet_regex: Regex,
    excess_newlines_regex: Regex,
    multi_space_regex: Regex,
    linkedin_regex: Regex,
    github_regex: Regex,
}

/// Contact details pulled from a resume before they are stripped for
/// embedding.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            url_regex: Regex::new(r"https?://\S+").expect("Invalid URL regex"),
            www_regex: Regex::new(r"www\.\S+").expect("Invalid www regex"),
            email_regex: Regex::new(r"\S+@\S+\.\S+").expect("Invalid email regex"),
            phone_regex: Regex::new(r"\+?[\d\s\-()]{10,}").expect("Invalid phone regex"),
            caps_header_regex: Regex::new(r"(?m)^[A-Z][A-Z \t]+$")
                .expect("Invalid caps header regex"),
            text_bullet_regex: Regex::new(r"(?m)^[-*+][ \t]").expect("Invalid bullet regex"),
            excess_newlines_regex: Regex::new(r"\n{3,}").expect("Invalid newline regex"),
            multi_space_regex: Regex::new(r" {2,}").expect("Invalid space regex"),
            linkedin_regex: Regex::new(r"(?i)linkedin\.com/in/[\w\-]+")
                .expect("Invalid linkedin regex"),
            github_regex: Regex::new(r"(?i)github\.com/[\w\-]+").expect("Invalid github regex"),
        }
    }

    /// Full cleaning pipeline. Never fails; empty or all-whitespace input
    /// yields an empty string.
    pub fn clean(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let text = self.normalize_unicode(text);
        let text = self.remove_control_chars(&text);
        let text = self.fix_whitespace(&text);
        let text = self.normalize_bullets(&text);
        let text = self.join_wrapped_lines(&text);
        let text = self
            .excess_newlines_regex
            .replace_all(&text, "\n\n")
            .to_string();

        text.trim().to_string()
    }

    /// Aggressive cleaning for embedding generation: strips URLs, emails,
    /// phone-shaped digit runs, and all-caps header-only lines on top of
    /// `clean`.
    pub fn clean_for_embedding(&self, text: &str) -> String {
        let text = self.clean(text);

        let text = self.url_regex.replace_all(&text, "");
        let text = self.www_regex.replace_all(&text, "");
        let text = self.email_regex.replace_all(&text, "");
        let text = self.phone_regex.replace_all(&text, "");
        let text = self.caps_header_regex.replace_all(&text, "");
        let text = self.multi_space_regex.replace_all(&text, " ");
        let text = self.excess_newlines_regex.replace_all(&text, "\n\n");

        text.trim().to_string()
    }

    /// Extract contact information from resume text.
    pub fn extract_contact_info(&self, text: &str) -> ContactInfo {
        ContactInfo {
            email: self
                .email_regex
                .find(text)
                .map(|m| m.as_str().to_string()),
            phone: self
                .phone_regex
                .find(text)
                .map(|m| m.as_str().trim().to_string()),
            linkedin: self
                .linkedin_regex
                .find(text)
                .map(|m| m.as_str().to_string()),
            github: self
                .github_regex
                .find(text)
                .map(|m| m.as_str().to_string()),
        }
    }

    fn normalize_unicode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\u{2018}' | '\u{2019}' => out.push('\''),
                '\u{201C}' | '\u{201D}' => out.push('"'),
                '\u{2013}' | '\u{2014}' => out.push('-'),
                '\u{2026}' => out.push_str("..."),
                '\u{00A0}' => out.push(' '),
                // Zero-width space, soft hyphen, BOM dropped entirely
                '\u{200B}' | '\u{00AD}' | '\u{FEFF}' => {}
                _ => out.push(c),
            }
        }
        out
    }

    fn remove_control_chars(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        text.chars()
            .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
            .collect()
    }

    fn fix_whitespace(&self, text: &str) -> String {
        let text = text.replace('\t', "    ");

        let lines: Vec<String> = text
            .split('\n')
            .map(|line| {
                let trimmed = line.trim_end();
                // Collapse interior space runs while preserving indentation
                let indent_len = trimmed.len() - trimmed.trim_start().len();
                let (indent, rest) = trimmed.split_at(indent_len);
                format!("{}{}", indent, self.multi_space_regex.replace_all(rest, " "))
            })
            .collect();

        lines.join("\n")
    }

    fn normalize_bullets(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if BULLET_GLYPHS.contains(&c) {
                out.push('•');
            } else {
                out.push(c);
            }
        }
        self.text_bullet_regex.replace_all(&out, "• ").to_string()
    }

    /// Re-join sentences broken by column-width wrapping: merge a line into
    /// the previous one when the previous line does not end in terminal
    /// punctuation and the current line starts with a lowercase letter.
    fn join_wrapped_lines(&self, text: &str) -> String {
        let mut result: Vec<String> = Vec::new();

        for line in text.split('\n') {
            let stripped = line.trim();
            if stripped.is_empty() {
                result.push(String::new());
                continue;
            }

            let joinable = result.last().is_some_and(|prev| {
                let prev = prev.trim_end();
                !prev.is_empty()
                    && !prev.ends_with(['.', '!', '?', ':', ';', '•'])
                    && stripped.chars().next().is_some_and(|c| c.is_lowercase())
            });

            if joinable {
                let prev = result.last_mut().expect("joinable implies a prior line");
                *prev = format!("{} {}", prev.trim_end(), stripped);
            } else {
                result.push(line.to_string());
            }
        }

        result.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let raw = "John  Doe\u{2019}s resume\n\n\n\n\u{2022} Built “things”\nand shipped them\n   \nEDUCATION\n";
        let once = normalizer.clean(raw);
        let twice = normalizer.clean(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_empty_input() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.clean(""), "");
        assert_eq!(normalizer.clean("   \n\t  \n"), "");
    }

    #[test]
    fn test_smart_punctuation_normalized() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean("\u{201C}quoted\u{201D} \u{2014} it\u{2019}s fine\u{2026}");
        assert_eq!(cleaned, "\"quoted\" - it's fine...");
    }

    #[test]
    fn test_invisible_characters_removed() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean("\u{FEFF}soft\u{00AD}ware\u{200B} engineer");
        assert_eq!(cleaned, "software engineer");
    }

    #[test]
    fn test_bullet_glyphs_normalized() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean("● Python\n▸ Rust\n- Go\n* SQL");
        assert_eq!(cleaned, "• Python\n• Rust\n• Go\n• SQL");
    }

    #[test]
    fn test_blank_lines_collapse() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean("First.\n\n\n\n\nSecond.");
        assert_eq!(cleaned, "First.\n\nSecond.");
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn test_wrapped_sentence_joined() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean("Led the migration of a legacy\nbilling system to Rust.");
        assert_eq!(
            cleaned,
            "Led the migration of a legacy billing system to Rust."
        );
    }

    #[test]
    fn test_intentional_breaks_preserved() {
        let normalizer = TextNormalizer::new();
        // Terminal punctuation and capitalized starts keep their line breaks
        let cleaned = normalizer.clean("Shipped v2.\nRewrote the parser.\n• Python\n• Rust");
        assert_eq!(cleaned, "Shipped v2.\nRewrote the parser.\n• Python\n• Rust");
    }

    #[test]
    fn test_control_chars_removed() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean("hello\u{0000}\u{0007} world");
        assert_eq!(cleaned, "hello world");
    }

    #[test]
    fn test_clean_for_embedding_strips_contact_noise() {
        let normalizer = TextNormalizer::new();
        let text = "JANE DOE\nEmail: jane@example.com\nSee https://example.com/cv\nBuilt APIs with Django.";
        let cleaned = normalizer.clean_for_embedding(text);
        assert!(!cleaned.contains("jane@example.com"));
        assert!(!cleaned.contains("https://"));
        assert!(!cleaned.contains("JANE DOE"));
        assert!(cleaned.contains("Built APIs with Django."));
    }

    #[test]
    fn test_extract_contact_info() {
        let normalizer = TextNormalizer::new();
        let text = "Jane Doe\njane@example.com\nlinkedin.com/in/jane-doe\ngithub.com/janedoe";
        let info = normalizer.extract_contact_info(text);
        assert_eq!(info.email.as_deref(), Some("jane@example.com"));
        assert_eq!(info.linkedin.as_deref(), Some("linkedin.com/in/jane-doe"));
        assert_eq!(info.github.as_deref(), Some("github.com/janedoe"));
    }
}
