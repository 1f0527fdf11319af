//! Weighted resume-vs-job-description scoring
//!
//! Four independently computed sub-scores blended with fixed weights. Each
//! sub-score mixes a cheap deterministic regex signal with at most one
//! semantic-similarity call, and each has a documented fallback when the
//! embedding backend is unavailable, so scoring always returns a complete
//! result.

use crate::error::{MatcherError, Result};
use crate::processing::embeddings::EmbeddingEngine;
use crate::processing::sections::{Section, SectionSegmenter};
use crate::processing::taxonomy::SkillMatcher;
use aho_corasick::AhoCorasickBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

/// Domain-term patterns used for keyword extraction from job descriptions.
/// Each pattern captures the term itself.
const TECH_TERM_PATTERNS: &[&str] = &[
    r"\b(Python|Java|JavaScript|TypeScript|React|Angular|Vue|Node\.?js)\b",
    r"\b(AWS|Azure|GCP|Docker|Kubernetes|K8s)\b",
    r"\b(SQL|NoSQL|MongoDB|PostgreSQL|MySQL|Redis)\b",
    r"\b(Machine Learning|ML|AI|Deep Learning|NLP|Computer Vision)\b",
    r"\b(REST|GraphQL|API|Microservices)\b",
    r"\b(Git|CI/CD|DevOps|Agile|Scrum)\b",
    r"\b(TensorFlow|PyTorch|Scikit-learn|Pandas|NumPy)\b",
];

/// Sub-score weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills_match: f32,
    pub experience_relevance: f32,
    pub keyword_coverage: f32,
    pub role_alignment: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills_match: 0.35,
            experience_relevance: 0.25,
            keyword_coverage: 0.20,
            role_alignment: 0.20,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<()> {
        let sum = self.skills_match
            + self.experience_relevance
            + self.keyword_coverage
            + self.role_alignment;
        if (sum - 1.0).abs() > 1e-4 {
            return Err(MatcherError::Configuration(format!(
                "Scoring weights must sum to 1.0, got {:.4}",
                sum
            )));
        }
        Ok(())
    }
}

/// Immutable scoring outcome: four sub-scores in [0, 100], their weighted
/// overall score, and the weights that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub overall_score: f32,
    pub skills_match: f32,
    pub experience_relevance: f32,
    pub keyword_coverage: f32,
    pub role_alignment: f32,
    pub weights: ScoringWeights,
}

/// Score plus the extracted evidence behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    #[serde(flatten)]
    pub score: ScoreResult,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub jd_years_required: Option<u32>,
    pub resume_years_stated: Option<u32>,
    pub job_title_detected: Option<String>,
}

pub struct ResumeScorer {
    weights: ScoringWeights,
    segmenter: SectionSegmenter,
    skills: SkillMatcher,
    tech_terms: Vec<Regex>,
    multi_word_regex: Regex,
    years_stated_regexes: Vec<Regex>,
    years_required_regexes: Vec<Regex>,
    title_regexes: Vec<Regex>,
}

impl Default for ResumeScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl ResumeScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        let years_of_experience = r"(?i)(\d+)\+?\s*(?:years?|yrs?)\s*(?:of)?\s*(?:experience|exp)";
        Self {
            weights,
            segmenter: SectionSegmenter::new(),
            skills: SkillMatcher::default(),
            tech_terms: TECH_TERM_PATTERNS
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).expect("Invalid tech term regex"))
                .collect(),
            multi_word_regex: Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)\b")
                .expect("Invalid multi-word regex"),
            years_stated_regexes: vec![
                Regex::new(years_of_experience).expect("Invalid years regex"),
                Regex::new(r"(?i)(?:experience|exp)[:\s]*(\d+)\+?\s*(?:years?|yrs?)")
                    .expect("Invalid years regex"),
            ],
            years_required_regexes: vec![
                Regex::new(years_of_experience).expect("Invalid years regex"),
                Regex::new(r"(?i)(?:minimum|at least)\s*(\d+)\s*(?:years?|yrs?)")
                    .expect("Invalid years regex"),
            ],
            title_regexes: vec![
                Regex::new(r"(?i)(?:job title|position|role)[:\s]*([^\n]+)")
                    .expect("Invalid title regex"),
                Regex::new(
                    r"(?i)^([^\n]*(?:engineer|developer|manager|analyst|designer|scientist)[^\n]*)",
                )
                .expect("Invalid title regex"),
            ],
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score a resume against a job description. Similarity failures are
    /// isolated per sub-score, so a complete result is always returned.
    pub fn score(&self, engine: &EmbeddingEngine, resume: &str, jd: &str) -> ScoreResult {
        let skills_match = self.skills_match_score(engine, resume, jd);
        let experience_relevance = self.experience_relevance_score(engine, resume, jd);
        let keyword_coverage = self.keyword_coverage_score(resume, jd);
        let role_alignment = self.role_alignment_score(engine, resume, jd);

        let overall = skills_match * self.weights.skills_match
            + experience_relevance * self.weights.experience_relevance
            + keyword_coverage * self.weights.keyword_coverage
            + role_alignment * self.weights.role_alignment;

        ScoreResult {
            overall_score: round1(overall.clamp(0.0, 100.0)),
            skills_match: round1(skills_match),
            experience_relevance: round1(experience_relevance),
            keyword_coverage: round1(keyword_coverage),
            role_alignment: round1(role_alignment),
            weights: self.weights,
        }
    }

    /// Score plus matched/missing keywords, detected years, and the job
    /// title the alignment sub-score keyed on.
    pub fn detailed_analysis(
        &self,
        engine: &EmbeddingEngine,
        resume: &str,
        jd: &str,
    ) -> DetailedAnalysis {
        let score = self.score(engine, resume, jd);

        let keywords = self.extract_keywords(jd);
        let present = keyword_presence(&keywords, resume);
        let (matched, missing): (Vec<_>, Vec<_>) = keywords
            .into_iter()
            .zip(present)
            .partition(|(_, hit)| *hit);

        DetailedAnalysis {
            score,
            matched_keywords: matched.into_iter().map(|(kw, _)| kw).collect(),
            missing_keywords: missing.into_iter().map(|(kw, _)| kw).collect(),
            jd_years_required: self.required_years(jd),
            resume_years_stated: self.stated_years(resume),
            job_title_detected: self.extract_job_title(jd),
        }
    }

    /// Semantic similarity between the resume's skills section and the JD's
    /// requirements section, boosted x120 for the section-specific
    /// comparison; whole-text similarity x100 when either section is absent.
    fn skills_match_score(&self, engine: &EmbeddingEngine, resume: &str, jd: &str) -> f32 {
        let resume_skills = self.segmenter.extract_section(resume, Section::Skills);
        let jd_requirements = self.segmenter.extract_section(jd, Section::Requirements);

        let outcome = match (&resume_skills, &jd_requirements) {
            (Some(skills), Some(requirements)) => engine
                .similarity(skills, requirements)
                .map(|s| (s * 120.0).min(100.0)),
            _ => engine.similarity(resume, jd).map(|s| (s * 100.0).min(100.0)),
        };

        match outcome {
            Ok(score) => score,
            Err(e) => {
                log::warn!("skills_match degraded to taxonomy overlap: {}", e);
                self.taxonomy_overlap_score(resume, jd)
            }
        }
    }

    /// Similarity between the resume's experience section (whole resume if
    /// absent) and the JD, plus a years-of-experience bonus.
    fn experience_relevance_score(&self, engine: &EmbeddingEngine, resume: &str, jd: &str) -> f32 {
        let experience = self
            .segmenter
            .extract_section(resume, Section::Experience)
            .unwrap_or_else(|| resume.to_string());

        let bonus = self.years_bonus(resume, jd);

        match engine.similarity(&experience, jd) {
            Ok(similarity) => (similarity * 100.0 + bonus).min(100.0),
            Err(e) => {
                log::warn!("experience_relevance degraded to neutral: {}", e);
                (50.0 + bonus).min(100.0)
            }
        }
    }

    /// Fraction of extracted JD keywords literally present in the resume,
    /// case-insensitive. Neutral 50 when the JD yields no keywords.
    fn keyword_coverage_score(&self, resume: &str, jd: &str) -> f32 {
        let keywords = self.extract_keywords(jd);
        if keywords.is_empty() {
            return 50.0;
        }

        let matched = keyword_presence(&keywords, resume)
            .into_iter()
            .filter(|hit| *hit)
            .count();

        ((matched as f32 / keywords.len() as f32) * 100.0).min(100.0)
    }

    /// Title-word overlap x30 plus whole-document similarity x70.
    fn role_alignment_score(&self, engine: &EmbeddingEngine, resume: &str, jd: &str) -> f32 {
        let title_match = self
            .extract_job_title(jd)
            .map(|title| self.title_overlap(&title, resume) * 30.0)
            .unwrap_or(0.0);

        match engine.similarity(resume, jd) {
            Ok(similarity) => (similarity * 70.0 + title_match).min(100.0),
            Err(e) => {
                log::warn!("role_alignment degraded to title overlap: {}", e);
                (title_match + 35.0).min(100.0)
            }
        }
    }

    /// Keyword-only stand-in for skills_match when similarity is
    /// unavailable: fraction of JD taxonomy skills present in the resume.
    fn taxonomy_overlap_score(&self, resume: &str, jd: &str) -> f32 {
        let jd_skills = self.skills.extract(jd);
        if jd_skills.is_empty() {
            return 50.0;
        }
        let resume_skills = self.skills.extract(resume);
        let missing = self.skills.find_missing(&resume_skills, &jd_skills).len();
        let matched = jd_skills.len() - missing;
        ((matched as f32 / jd_skills.len() as f32) * 100.0).min(100.0)
    }

    fn years_bonus(&self, resume: &str, jd: &str) -> f32 {
        match (self.stated_years(resume), self.required_years(jd)) {
            (Some(stated), Some(required)) if stated >= required => 10.0,
            (Some(stated), Some(required)) if stated as f32 >= required as f32 * 0.7 => 5.0,
            _ => 0.0,
        }
    }

    fn stated_years(&self, resume: &str) -> Option<u32> {
        first_captured_number(&self.years_stated_regexes, resume)
    }

    fn required_years(&self, jd: &str) -> Option<u32> {
        first_captured_number(&self.years_required_regexes, jd)
    }

    /// Keywords worth checking coverage for: known domain terms plus
    /// capitalized multi-word phrases longer than 5 characters. Lowercased
    /// and sorted so coverage is deterministic.
    fn extract_keywords(&self, text: &str) -> Vec<String> {
        let mut keywords = BTreeSet::new();

        for regex in &self.tech_terms {
            for caps in regex.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    keywords.insert(m.as_str().to_lowercase());
                }
            }
        }

        for caps in self.multi_word_regex.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                if m.as_str().len() > 5 {
                    keywords.insert(m.as_str().to_lowercase());
                }
            }
        }

        keywords.into_iter().collect()
    }

    /// Job title from an explicit "title/position/role:" line, a
    /// role-word-bearing first line, or any first line under 100 characters.
    fn extract_job_title(&self, jd: &str) -> Option<String> {
        for regex in &self.title_regexes {
            if let Some(caps) = regex.captures(jd) {
                if let Some(m) = caps.get(1) {
                    let title = m.as_str().trim();
                    if !title.is_empty() {
                        return Some(title.to_string());
                    }
                }
            }
        }

        let first_line = jd.lines().next()?.trim();
        (!first_line.is_empty() && first_line.len() < 100).then(|| first_line.to_string())
    }

    /// Fraction of title words appearing anywhere in the resume.
    fn title_overlap(&self, title: &str, resume: &str) -> f32 {
        let resume_lower = resume.to_lowercase();
        let title_words: BTreeSet<String> = title
            .unicode_words()
            .map(|w| w.to_lowercase())
            .collect();
        if title_words.is_empty() {
            return 0.0;
        }

        let matched = title_words
            .iter()
            .filter(|word| resume_lower.contains(word.as_str()))
            .count();
        matched as f32 / title_words.len() as f32
    }
}

/// Case-insensitive substring presence of each keyword in the text, in one
/// multi-pattern pass.
fn keyword_presence(keywords: &[String], text: &str) -> Vec<bool> {
    if keywords.is_empty() {
        return Vec::new();
    }

    let searcher = AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(keywords)
        .expect("Invalid keyword automaton");

    let mut present = vec![false; keywords.len()];
    for hit in searcher.find_overlapping_iter(text) {
        present[hit.pattern().as_usize()] = true;
    }
    present
}

fn first_captured_number(regexes: &[Regex], text: &str) -> Option<u32> {
    regexes
        .iter()
        .find_map(|regex| regex.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::{EmbeddingBackend, HashEmbeddingBackend};

    /// Backend whose every call fails, for exercising degraded scoring.
    struct DeadBackend;

    impl EmbeddingBackend for DeadBackend {
        fn name(&self) -> &str {
            "dead"
        }

        fn dimension(&self) -> usize {
            0
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MatcherError::EmbeddingUnavailable("backend offline".to_string()))
        }
    }

    const RESUME: &str = "Jane Doe\nSenior Backend Engineer\n\nSummary:\n5 years of experience building Python services.\n\nExperience\nAcme Corp\nBuilt REST APIs with Python, Django and PostgreSQL on AWS.\n\nSkills\nPython, Django, PostgreSQL, Docker, AWS";

    const JD: &str = "Senior Backend Engineer\n\nRequirements:\n3+ years of experience with Python\nDjango and PostgreSQL\nAWS deployment experience\nKubernetes is a plus";

    fn engine() -> EmbeddingEngine {
        EmbeddingEngine::new(Box::new(HashEmbeddingBackend::new(128)))
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        ScoringWeights::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = ScoringWeights {
            skills_match: 0.5,
            experience_relevance: 0.5,
            keyword_coverage: 0.5,
            role_alignment: 0.5,
        };
        assert!(matches!(
            weights.validate(),
            Err(MatcherError::Configuration(_))
        ));
    }

    #[test]
    fn test_score_in_range_and_rounded() {
        let scorer = ResumeScorer::default();
        let result = scorer.score(&engine(), RESUME, JD);

        for value in [
            result.overall_score,
            result.skills_match,
            result.experience_relevance,
            result.keyword_coverage,
            result.role_alignment,
        ] {
            assert!((0.0..=100.0).contains(&value));
            assert_eq!(value, round1(value));
        }
    }

    #[test]
    fn test_matching_resume_beats_unrelated() {
        let scorer = ResumeScorer::default();
        let engine = engine();
        let unrelated = "Pastry chef with a passion for sourdough.\n\nSkills\nbaking, lamination";

        let good = scorer.score(&engine, RESUME, JD);
        let bad = scorer.score(&engine, unrelated, JD);
        assert!(good.overall_score > bad.overall_score);
    }

    #[test]
    fn test_years_extraction() {
        let scorer = ResumeScorer::default();
        assert_eq!(scorer.stated_years(RESUME), Some(5));
        assert_eq!(scorer.required_years(JD), Some(3));
        assert_eq!(
            scorer.required_years("minimum 7 years in the field"),
            Some(7)
        );
        assert_eq!(scorer.stated_years("no numbers here"), None);
    }

    #[test]
    fn test_years_bonus_tiers() {
        let scorer = ResumeScorer::default();
        assert_eq!(scorer.years_bonus("10 years of experience", "5 years of experience"), 10.0);
        assert_eq!(scorer.years_bonus("4 years of experience", "5 years of experience"), 5.0);
        assert_eq!(scorer.years_bonus("1 year of experience", "5 years of experience"), 0.0);
        assert_eq!(scorer.years_bonus("no years stated", "5 years of experience"), 0.0);
    }

    #[test]
    fn test_keyword_extraction_and_coverage() {
        let scorer = ResumeScorer::default();
        let keywords = scorer.extract_keywords(JD);
        assert!(keywords.contains(&"python".to_string()));
        assert!(keywords.contains(&"aws".to_string()));
        assert!(keywords.contains(&"kubernetes".to_string()));

        let coverage = scorer.keyword_coverage_score(RESUME, JD);
        assert!(coverage > 0.0);
        assert!(coverage < 100.0); // Kubernetes is missing from the resume
    }

    #[test]
    fn test_no_keywords_is_neutral() {
        let scorer = ResumeScorer::default();
        assert_eq!(scorer.keyword_coverage_score(RESUME, "we want nice people"), 50.0);
    }

    #[test]
    fn test_job_title_detection() {
        let scorer = ResumeScorer::default();
        assert_eq!(
            scorer.extract_job_title("Job Title: Staff Platform Engineer\n..."),
            Some("Staff Platform Engineer".to_string())
        );
        assert_eq!(
            scorer.extract_job_title(JD),
            Some("Senior Backend Engineer".to_string())
        );
        // Short first line used as a last resort
        assert_eq!(
            scorer.extract_job_title("Head of Data\nWe are hiring."),
            Some("Head of Data".to_string())
        );
    }

    #[test]
    fn test_detailed_analysis_evidence() {
        let scorer = ResumeScorer::default();
        let analysis = scorer.detailed_analysis(&engine(), RESUME, JD);

        assert!(analysis.matched_keywords.contains(&"python".to_string()));
        assert!(analysis.missing_keywords.contains(&"kubernetes".to_string()));
        assert_eq!(analysis.resume_years_stated, Some(5));
        assert_eq!(analysis.jd_years_required, Some(3));
        assert_eq!(
            analysis.job_title_detected.as_deref(),
            Some("Senior Backend Engineer")
        );
    }

    #[test]
    fn test_similarity_failure_isolated_per_sub_score() {
        let scorer = ResumeScorer::default();
        let engine = EmbeddingEngine::new(Box::new(DeadBackend));
        let result = scorer.score(&engine, RESUME, JD);

        // Keyword coverage never touches the backend
        assert!(result.keyword_coverage > 0.0);
        // skills_match degrades to taxonomy overlap: 4 of 5 JD skills present
        assert_eq!(result.skills_match, 80.0);
        // experience degrades to neutral 50 plus the years bonus (5 >= 3)
        assert_eq!(result.experience_relevance, 60.0);
        // role alignment degrades to full title overlap x30 plus neutral 35
        assert_eq!(result.role_alignment, 65.0);
        assert!((0.0..=100.0).contains(&result.overall_score));
    }

    #[test]
    fn test_empty_inputs_still_produce_a_score() {
        let scorer = ResumeScorer::default();
        let result = scorer.score(&engine(), "", "");
        assert!((0.0..=100.0).contains(&result.overall_score));
    }
}
