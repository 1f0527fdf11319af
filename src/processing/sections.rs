//! Section segmentation for resumes and job descriptions
//!
//! A streaming line scanner assigns every line to the section named by the
//! most recent header line. One compiled header table drives both the full
//! segmentation and the single-section extraction path, so the two can never
//! disagree on section boundaries.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Awards,
    Requirements,
    Other,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Header => "header",
            Section::Summary => "summary",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
            Section::Awards => "awards",
            Section::Requirements => "requirements",
            Section::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Section name to joined, trimmed content. A key is present only when
/// non-empty content was detected under it.
pub type SectionMap = BTreeMap<Section, String>;

/// Ordered header-recognition rules. Each alternation matches a short
/// standalone line, optionally ending in a colon. Rules are data so they can
/// be tested independently of the scanning loop.
const HEADER_RULES: &[(&str, Section)] = &[
    (r"summary|objective|profile", Section::Summary),
    (r"education|academic\s*background", Section::Education),
    (
        r"experience|work\s*experience|professional\s*experience|work\s*history|employment",
        Section::Experience,
    ),
    (r"skills|technical\s*skills|core\s*competencies", Section::Skills),
    (r"projects|personal\s*projects|portfolio", Section::Projects),
    (r"certifications?|certificates?|licenses?", Section::Certifications),
    (r"awards?|achievements?|honors?", Section::Awards),
    (
        r"requirements?|qualifications?|required\s*skills?",
        Section::Requirements,
    ),
    // JD boundary headers: recognized so preceding sections end there
    (r"responsibilities|duties", Section::Other),
    (r"benefits?|perks", Section::Other),
];

pub struct SectionSegmenter {
    patterns: Vec<(Regex, Section)>,
}

impl Default for SectionSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionSegmenter {
    pub fn new() -> Self {
        let patterns = HEADER_RULES
            .iter()
            .map(|(alts, section)| {
                let pattern = format!(r"(?i)^(?:{})\s*:?\s*$", alts);
                (
                    Regex::new(&pattern).expect("Invalid section header regex"),
                    *section,
                )
            })
            .collect();
        Self { patterns }
    }

    /// Recognize a trimmed line as a section header.
    pub fn match_header(&self, line: &str) -> Option<Section> {
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(line))
            .map(|(_, section)| *section)
    }

    /// Split text into named sections. Lines before the first recognized
    /// header land in `Section::Header`; header lines themselves are consumed.
    pub fn segment(&self, text: &str) -> SectionMap {
        let mut collected: BTreeMap<Section, Vec<&str>> = BTreeMap::new();
        let mut cursor = Section::Header;

        for line in text.lines() {
            match self.match_header(line.trim()) {
                Some(section) => cursor = section,
                None => collected.entry(cursor).or_default().push(line),
            }
        }

        collected
            .into_iter()
            .filter_map(|(section, lines)| {
                let content = lines.join("\n").trim().to_string();
                (!content.is_empty()).then_some((section, content))
            })
            .collect()
    }

    /// Extract a single section's content without building the full map.
    /// Uses the same cursor logic as `segment`, so both paths agree on
    /// boundaries; repeated headers for the target section accumulate.
    pub fn extract_section(&self, text: &str, target: Section) -> Option<String> {
        let mut lines: Vec<&str> = Vec::new();
        let mut cursor = Section::Header;

        for line in text.lines() {
            match self.match_header(line.trim()) {
                Some(section) => cursor = section,
                None if cursor == target => lines.push(line),
                None => {}
            }
        }

        let content = lines.join("\n").trim().to_string();
        (!content.is_empty()).then_some(content)
    }
}
