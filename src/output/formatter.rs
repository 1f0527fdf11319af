//! Formatters rendering a `MatchReport` for people and for machines

use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::analyzer::MatchReport;
use crate::processing::gaps::{ImportanceTier, RoadmapPhase, SkillGap};
use colored::{Color, Colorize};

/// Render a report in the requested format.
pub fn format_report(
    report: &MatchReport,
    format: OutputFormat,
    color: bool,
    detailed: bool,
) -> Result<String> {
    match format {
        OutputFormat::Console => ConsoleFormatter::new(color, detailed).format(report),
        OutputFormat::Json => JsonFormatter::pretty().format(report),
        OutputFormat::Markdown => MarkdownFormatter::new().format(report),
    }
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            use_colors,
            detailed,
        }
    }

    pub fn format(&self, report: &MatchReport) -> Result<String> {
        let mut out = String::new();
        let score = &report.analysis.score;

        out.push_str(&self.header("RESUME MATCH ANALYSIS"));
        out.push_str(&format!(
            "Analyzed: {} | Processing time: {}ms | Model: {} ({}d)\n",
            report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.processing_time_ms,
            report.model_info.backend,
            report.model_info.dimension
        ));

        out.push_str(&format!(
            "\nOverall Score: {} {}\n\n",
            self.colorize(&format!("{:.1}", score.overall_score), Color::Cyan),
            self.score_badge(score.overall_score)
        ));

        out.push_str(&format!(
            "  Skills match:         {:>5.1}  (weight {:.0}%)\n",
            score.skills_match,
            score.weights.skills_match * 100.0
        ));
        out.push_str(&format!(
            "  Experience relevance: {:>5.1}  (weight {:.0}%)\n",
            score.experience_relevance,
            score.weights.experience_relevance * 100.0
        ));
        out.push_str(&format!(
            "  Keyword coverage:     {:>5.1}  (weight {:.0}%)\n",
            score.keyword_coverage,
            score.weights.keyword_coverage * 100.0
        ));
        out.push_str(&format!(
            "  Role alignment:       {:>5.1}  (weight {:.0}%)\n",
            score.role_alignment,
            score.weights.role_alignment * 100.0
        ));

        if let Some(title) = &report.analysis.job_title_detected {
            out.push_str(&format!("\nTarget role: {}\n", self.colorize(title, Color::Blue)));
        }

        if !report.resume_skills.is_empty() {
            out.push_str(&self.subheader("Skills found"));
            out.push_str(&format!("  {}\n", report.resume_skills.join(", ")));
        }

        if !report.missing_skills.is_empty() {
            out.push_str(&self.subheader("Missing from resume"));
            for skill in &report.missing_skills {
                out.push_str(&format!(
                    "  - {} ({:?})\n",
                    self.colorize(&skill.name, Color::Yellow),
                    skill.importance
                ));
            }
        }

        let gaps = &report.gap_report;
        if !gaps.missing_skills.is_empty() {
            out.push_str(&self.subheader(&format!("Skill gaps for '{}'", gaps.role)));
            for gap in &gaps.missing_skills {
                out.push_str(&format!("  - {}\n", self.gap_line(gap)));
            }
        }

        out.push_str(&self.subheader("90-day roadmap"));
        for phase in [&gaps.roadmap.phase1, &gaps.roadmap.phase2, &gaps.roadmap.phase3] {
            out.push_str(&self.phase_line(phase));
        }

        if self.detailed {
            if !report.analysis.matched_keywords.is_empty() {
                out.push_str(&self.subheader("Matched keywords"));
                out.push_str(&format!("  {}\n", report.analysis.matched_keywords.join(", ")));
            }
            if !report.analysis.missing_keywords.is_empty() {
                out.push_str(&self.subheader("Missing keywords"));
                out.push_str(&format!("  {}\n", report.analysis.missing_keywords.join(", ")));
            }
            if !report.top_matching_chunks.is_empty() {
                out.push_str(&self.subheader("Best matching resume excerpts"));
                for chunk in &report.top_matching_chunks {
                    out.push_str(&format!("  [{:.2}] {}\n", chunk.similarity, chunk.preview));
                }
            }
        }

        Ok(out)
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, title: &str) -> String {
        format!("\n{}\n{}\n", self.colorize(title, Color::Blue), "=".repeat(title.len()))
    }

    fn subheader(&self, title: &str) -> String {
        format!("\n{}\n", self.colorize(title, Color::Green))
    }

    fn score_badge(&self, score: f32) -> String {
        let (badge, color) = match score as u32 {
            85..=100 => ("[EXCELLENT]", Color::Green),
            70..=84 => ("[GOOD]", Color::BrightGreen),
            55..=69 => ("[FAIR]", Color::Yellow),
            40..=54 => ("[WEAK]", Color::BrightRed),
            _ => ("[POOR]", Color::Red),
        };
        if self.use_colors {
            badge.color(color).bold().to_string()
        } else {
            badge.to_string()
        }
    }

    fn gap_line(&self, gap: &SkillGap) -> String {
        let color = match gap.importance {
            ImportanceTier::Critical => Color::Red,
            ImportanceTier::Important => Color::Yellow,
            ImportanceTier::NiceToHave => Color::White,
        };
        format!(
            "{} ({:?}, {} -> {})",
            self.colorize(&gap.name, color),
            gap.importance,
            gap.current_level,
            gap.required_level
        )
    }

    fn phase_line(&self, phase: &RoadmapPhase) -> String {
        let skills = if phase.skills.is_empty() {
            "-".to_string()
        } else {
            phase.skills.join(", ")
        };
        format!("  {} {}: {}\n", phase.day, phase.title, skills)
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn format(&self, report: &MatchReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

#[derive(Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, report: &MatchReport) -> Result<String> {
        let mut out = String::new();
        let score = &report.analysis.score;

        out.push_str("# Resume Match Analysis\n\n");
        out.push_str(&format!(
            "Analyzed {} with `{}` in {}ms.\n\n",
            report.analyzed_at.format("%Y-%m-%d %H:%M UTC"),
            report.model_info.backend,
            report.processing_time_ms
        ));

        out.push_str(&format!("## Overall Score: {:.1}\n\n", score.overall_score));
        out.push_str("| Sub-score | Value | Weight |\n|---|---|---|\n");
        out.push_str(&format!(
            "| Skills match | {:.1} | {:.0}% |\n",
            score.skills_match,
            score.weights.skills_match * 100.0
        ));
        out.push_str(&format!(
            "| Experience relevance | {:.1} | {:.0}% |\n",
            score.experience_relevance,
            score.weights.experience_relevance * 100.0
        ));
        out.push_str(&format!(
            "| Keyword coverage | {:.1} | {:.0}% |\n",
            score.keyword_coverage,
            score.weights.keyword_coverage * 100.0
        ));
        out.push_str(&format!(
            "| Role alignment | {:.1} | {:.0}% |\n\n",
            score.role_alignment,
            score.weights.role_alignment * 100.0
        ));

        if !report.resume_skills.is_empty() {
            out.push_str("## Skills Found\n\n");
            out.push_str(&format!("{}\n\n", report.resume_skills.join(", ")));
        }

        if !report.missing_skills.is_empty() {
            out.push_str("## Missing Skills\n\n");
            for skill in &report.missing_skills {
                out.push_str(&format!("- {} ({:?})\n", skill.name, skill.importance));
            }
            out.push('\n');
        }

        let gaps = &report.gap_report;
        out.push_str(&format!("## Roadmap for `{}`\n\n", gaps.role));
        for phase in [&gaps.roadmap.phase1, &gaps.roadmap.phase2, &gaps.roadmap.phase3] {
            out.push_str(&format!(
                "### {}: {}\n\n{}\n\n",
                phase.day,
                phase.title,
                if phase.skills.is_empty() {
                    "No items".to_string()
                } else {
                    phase.skills.join(", ")
                }
            ));
        }

        Ok(out)
    }
}
