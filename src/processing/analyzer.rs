//! Main matching engine coordinating normalization, extraction, scoring, and
//! gap analysis

use crate::config::{Config, EmbeddingBackendKind};
use crate::error::Result;
use crate::processing::embeddings::{
    chunk_text, EmbeddingBackend, EmbeddingEngine, HashEmbeddingBackend, Model2VecBackend,
};
use crate::processing::gaps::{GapAnalyzer, GapReport};
use crate::processing::index::{IndexBackend, VectorIndex};
use crate::processing::normalizer::{ContactInfo, TextNormalizer};
use crate::processing::scorer::{DetailedAnalysis, ResumeScorer};
use crate::processing::sections::{Section, SectionSegmenter};
use crate::processing::taxonomy::{SkillImportance, SkillMatcher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Coordinates the full analysis pipeline. Construct once and share; every
/// component is read-only after initialization.
pub struct MatchEngine {
    normalizer: TextNormalizer,
    segmenter: SectionSegmenter,
    skills: SkillMatcher,
    scorer: ResumeScorer,
    gaps: GapAnalyzer,
    embeddings: EmbeddingEngine,
    config: Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    #[serde(flatten)]
    pub analysis: DetailedAnalysis,

    pub resume_skills: Vec<String>,
    pub jd_skills: Vec<String>,
    pub missing_skills: Vec<MissingSkill>,
    pub skill_categories: BTreeMap<String, Vec<String>>,
    pub contact: ContactInfo,
    pub gap_report: GapReport,
    pub top_matching_chunks: Vec<ChunkMatch>,

    pub model_info: ModelInfo,
    pub processing_time_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

/// A skill the JD asks for that the resume lacks, with how strongly the JD
/// phrases the requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingSkill {
    pub name: String,
    pub importance: SkillImportance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMatch {
    pub similarity: f32,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub backend: String,
    pub dimension: usize,
}

impl MatchEngine {
    pub async fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend: Box<dyn EmbeddingBackend> = match config.embedding.backend {
            EmbeddingBackendKind::Model2Vec => Box::new(Model2VecBackend::load(
                &config.model_path(),
                &config.embedding.model_name,
            )?),
            EmbeddingBackendKind::Hash => {
                Box::new(HashEmbeddingBackend::new(config.embedding.hash_dimension))
            }
        };

        Ok(Self::with_backend(config, backend))
    }

    /// Build the engine around an already-constructed embedding backend.
    pub fn with_backend(config: &Config, backend: Box<dyn EmbeddingBackend>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            segmenter: SectionSegmenter::new(),
            skills: SkillMatcher::default(),
            scorer: ResumeScorer::new(config.scoring),
            gaps: GapAnalyzer::new(config.roles.catalog.clone()),
            embeddings: EmbeddingEngine::new(backend),
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline for one resume / job-description pair.
    pub fn analyze(&self, resume_raw: &str, jd_raw: &str, role: Option<&str>) -> Result<MatchReport> {
        let start_time = Instant::now();

        let contact = self.normalizer.extract_contact_info(resume_raw);
        let resume = self.normalizer.clean(resume_raw);
        let jd = self.normalizer.clean(jd_raw);

        let resume_sections = self.segmenter.segment(&resume);
        let resume_skills = self
            .skills
            .extract_with_section(&resume, resume_sections.get(&Section::Skills).map(String::as_str));
        let jd_skills = self.skills.extract(&jd);

        let missing_skills: Vec<MissingSkill> = self
            .skills
            .find_missing(&resume_skills, &jd_skills)
            .into_iter()
            .map(|name| {
                let importance = self.skills.importance(&name, &jd);
                MissingSkill { name, importance }
            })
            .collect();

        let skill_categories = self.skills.categorize(&resume_skills);

        let analysis = self.scorer.detailed_analysis(&self.embeddings, &resume, &jd);

        let role = role.unwrap_or(&self.config.roles.default_role);
        let gap_report = self.gaps.analyze(&resume_skills, role);

        let top_matching_chunks = self.best_chunks(&resume, &jd)?;

        log::info!(
            "Analysis complete: overall score {:.1} for role '{}'",
            analysis.score.overall_score,
            gap_report.role
        );

        Ok(MatchReport {
            analysis,
            resume_skills,
            jd_skills,
            missing_skills,
            skill_categories,
            contact,
            gap_report,
            top_matching_chunks,
            model_info: ModelInfo {
                backend: self.embeddings.backend_name().to_string(),
                dimension: self.embeddings.dimension(),
            },
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            analyzed_at: Utc::now(),
        })
    }

    /// Resume chunks most similar to the JD, as evidence for the score.
    /// Chunk vectors are ranked through the vector index; failures here only
    /// cost the evidence, never the score.
    fn best_chunks(&self, resume: &str, jd: &str) -> Result<Vec<ChunkMatch>> {
        let query = self.normalizer.clean_for_embedding(jd);
        let chunks = chunk_text(
            &self.normalizer.clean_for_embedding(resume),
            self.config.processing.chunk_size,
            self.config.processing.chunk_overlap,
        );

        let ranked = match self.rank_chunks(&query, chunks) {
            Ok(ranked) => ranked,
            Err(e) => {
                log::warn!("Chunk ranking unavailable: {}", e);
                Vec::new()
            }
        };

        Ok(ranked
            .into_iter()
            .map(|(_, similarity, text)| ChunkMatch {
                similarity,
                preview: preview(&text, 160),
            })
            .collect())
    }

    fn rank_chunks(&self, query: &str, chunks: Vec<String>) -> Result<Vec<(usize, f32, String)>> {
        let query_vec = self.embeddings.embed(query)?;
        let chunk_vecs = self.embeddings.embed_batch(&chunks)?;

        let mut index = VectorIndex::new(self.embeddings.dimension(), IndexBackend::Flat);
        index.add(chunk_vecs, chunks)?;
        index.search(
            &query_vec,
            self.config.processing.top_k_chunks,
            self.config.processing.similarity_threshold,
        )
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\njane@example.com\nSenior Backend Engineer\n\nSummary:\n5 years of experience building Python services.\n\nExperience\nAcme Corp\nBuilt REST APIs with Python, Django and PostgreSQL on AWS.\n\nSkills\nPython, Django, PostgreSQL, Docker, AWS";

    const JD: &str = "Senior Backend Engineer\n\nRequirements:\n3+ years of experience with Python.\nDjango and PostgreSQL required.\nAWS deployment experience.\nKubernetes is a plus.";

    fn engine() -> MatchEngine {
        let mut config = Config::default();
        config.embedding.backend = EmbeddingBackendKind::Hash;
        MatchEngine::with_backend(&config, Box::new(HashEmbeddingBackend::new(128)))
    }

    #[test]
    fn test_full_pipeline_report() {
        let engine = engine();
        let report = engine.analyze(RESUME, JD, Some("backend")).unwrap();

        assert!((0.0..=100.0).contains(&report.analysis.score.overall_score));
        assert!(report.resume_skills.contains(&"Python".to_string()));
        assert!(report.jd_skills.contains(&"Kubernetes".to_string()));
        assert!(report
            .missing_skills
            .iter()
            .any(|s| s.name == "Kubernetes"));
        assert_eq!(report.contact.email.as_deref(), Some("jane@example.com"));
        assert_eq!(report.gap_report.role, "backend");
        assert_eq!(report.model_info.dimension, 128);
    }

    #[test]
    fn test_missing_skill_importance_from_jd_phrasing() {
        let engine = engine();
        let report = engine.analyze(RESUME, JD, None).unwrap();

        let kubernetes = report
            .missing_skills
            .iter()
            .find(|s| s.name == "Kubernetes")
            .unwrap();
        assert_eq!(kubernetes.importance, SkillImportance::Preferred);
    }

    #[test]
    fn test_default_role_when_none_given() {
        let engine = engine();
        let report = engine.analyze(RESUME, JD, None).unwrap();
        assert_eq!(report.gap_report.role, "sde");
    }

    #[test]
    fn test_empty_resume_still_scores() {
        let engine = engine();
        let report = engine.analyze("", JD, None).unwrap();
        assert!(report.resume_skills.is_empty());
        assert!((0.0..=100.0).contains(&report.analysis.score.overall_score));
    }

    #[test]
    fn test_report_serializes() {
        let engine = engine();
        let report = engine.analyze(RESUME, JD, None).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("overall_score"));
        assert!(json.contains("phase1"));
    }
}
