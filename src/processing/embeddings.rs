//! Semantic similarity over embedding vectors
//!
//! The engine does not care which model produces the vectors, only that every
//! vector compared comes from the same backend and dimension. Backends fail
//! loudly (`MatcherError::EmbeddingUnavailable`) instead of silently
//! returning zeros, so callers can decide whether to degrade to keyword-only
//! scoring.

use crate::error::{MatcherError, Result};
use model2vec_rs::model::StaticModel;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: usize = 200;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Vector-space contract for embedding providers: one or many texts in,
/// fixed-dimension float vectors out.
pub trait EmbeddingBackend: Send + Sync {
    fn name(&self) -> &str;
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Model2Vec static embedding model backend.
pub struct Model2VecBackend {
    model: StaticModel,
    dimension: usize,
    name: String,
}

impl Model2VecBackend {
    pub fn load(model_path: &Path, name: &str) -> Result<Self> {
        log::info!("Loading Model2Vec embedding model from {}", model_path.display());

        let model = StaticModel::from_pretrained(model_path, None, None, None)
            .map_err(|e| MatcherError::EmbeddingUnavailable(format!("Failed to load model: {}", e)))?;

        let dimension = model.encode_single("dimension probe").len();
        log::debug!("Embedding model ready, dimension {}", dimension);

        Ok(Self {
            model,
            dimension,
            name: name.to_string(),
        })
    }
}

impl EmbeddingBackend for Model2VecBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }
}

/// Deterministic bag-of-words projection backend. No model files required;
/// useful offline and as the test double for the model-backed path. Tokens
/// are hashed into a fixed number of buckets, so identical texts always map
/// to identical vectors.
pub struct HashEmbeddingBackend {
    dimension: usize,
}

impl Default for HashEmbeddingBackend {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashEmbeddingBackend {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingBackend for HashEmbeddingBackend {
    fn name(&self) -> &str {
        "hash-bow"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() % self.dimension as u64) as usize] += 1.0;
        }
        Ok(vector)
    }
}

/// Similarity provider over an embedding backend.
pub struct EmbeddingEngine {
    backend: Box<dyn EmbeddingBackend>,
}

impl EmbeddingEngine {
    pub fn new(backend: Box<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.backend.embed(text)
    }

    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.backend.embed_batch(texts)
    }

    /// Cosine similarity between two texts, clamped to [0, 1]. Zero-magnitude
    /// vectors compare as 0 rather than dividing by zero.
    pub fn similarity(&self, text1: &str, text2: &str) -> Result<f32> {
        let a = self.backend.embed(text1)?;
        let b = self.backend.embed(text2)?;
        cosine_similarity(&a, &b)
    }

    /// Pairwise cosine similarity between two text lists. Every vector is L2
    /// normalized once, then pairs reduce to dot products.
    pub fn similarity_matrix(&self, texts1: &[String], texts2: &[String]) -> Result<Vec<Vec<f32>>> {
        let rows: Vec<Vec<f32>> = self
            .backend
            .embed_batch(texts1)?
            .into_iter()
            .map(|v| l2_normalize(&v))
            .collect();
        let cols: Vec<Vec<f32>> = self
            .backend
            .embed_batch(texts2)?
            .into_iter()
            .map(|v| l2_normalize(&v))
            .collect();

        let mut matrix = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut out = Vec::with_capacity(cols.len());
            for col in &cols {
                if row.len() != col.len() {
                    return Err(MatcherError::DimensionMismatch {
                        expected: row.len(),
                        actual: col.len(),
                    });
                }
                out.push(dot(row, col).clamp(0.0, 1.0));
            }
            matrix.push(out);
        }
        Ok(matrix)
    }

    /// Rank document chunks by similarity to a query, descending, truncated
    /// to `top_k` results at or above `threshold`.
    pub fn similar_chunks(
        &self,
        query: &str,
        documents: &[String],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<(usize, f32, String)>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.backend.embed(query)?;
        let doc_vecs = self.backend.embed_batch(documents)?;

        let mut scored: Vec<(usize, f32)> = doc_vecs
            .iter()
            .enumerate()
            .map(|(i, v)| Ok((i, cosine_similarity(&query_vec, v)?)))
            .collect::<Result<_>>()?;

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .filter(|(_, score)| *score >= threshold)
            .map(|(i, score)| (i, score, documents[i].clone()))
            .collect())
    }
}

/// Split text into overlapping word windows so similarity against a long
/// document can be computed chunk-wise instead of diluting one vector.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() <= chunk_size || chunk_size <= overlap {
        return vec![text.to_string()];
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start + overlap < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += step;
    }
    chunks
}

/// Cosine similarity clamped to [0, 1]; errors on mismatched dimensions,
/// returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(MatcherError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot(a, b) / (norm_a * norm_b)).clamp(0.0, 1.0))
}

pub(crate) fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EmbeddingEngine {
        EmbeddingEngine::new(Box::new(HashEmbeddingBackend::new(64)))
    }

    #[test]
    fn test_self_similarity_is_one() {
        let engine = engine();
        let text = "Experienced Python developer building REST APIs";
        let similarity = engine.similarity(text, text).unwrap();
        assert!((similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_similarity_is_zero() {
        let engine = engine();
        let similarity = engine.similarity("Python developer", "").unwrap();
        assert_eq!(similarity, 0.0);
        assert_eq!(engine.similarity("", "").unwrap(), 0.0);
    }

    #[test]
    fn test_related_texts_more_similar_than_unrelated() {
        let engine = engine();
        let related = engine
            .similarity("Python Django REST developer", "Django Python engineer")
            .unwrap();
        let unrelated = engine
            .similarity("Python Django REST developer", "pastry chef sourdough baking")
            .unwrap();
        assert!(related > unrelated);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let result = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(
            result,
            Err(MatcherError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_similarity_matrix_shape_and_diagonal() {
        let engine = engine();
        let texts = vec!["Rust systems programming".to_string(), "Python data science".to_string()];
        let matrix = engine.similarity_matrix(&texts, &texts).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].len(), 2);
        assert!((matrix[0][0] - 1.0).abs() < 1e-5);
        assert!((matrix[1][1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_chunking_short_text_is_single_chunk() {
        let chunks = chunk_text("short text here", DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(chunks, vec!["short text here".to_string()]);
    }

    #[test]
    fn test_chunking_overlap() {
        let words: Vec<String> = (0..25).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        let chunks = chunk_text(&text, 10, 5);

        assert!(chunks.len() > 1);
        // Consecutive chunks share the overlap region
        assert!(chunks[0].ends_with("w9"));
        assert!(chunks[1].starts_with("w5"));
        // Every word is covered
        assert!(chunks.last().unwrap().ends_with("w24"));
    }

    #[test]
    fn test_similar_chunks_ranked_and_thresholded() {
        let engine = engine();
        let docs = vec![
            "Python backend development with Django".to_string(),
            "gardening and landscape design".to_string(),
            "Python Django REST API work".to_string(),
        ];
        let results = engine
            .similar_chunks("Python Django developer", &docs, 2, 0.01)
            .unwrap();

        assert!(results.len() <= 2);
        assert!(!results.is_empty());
        // Descending order
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        // Best matches are the Python documents
        assert_ne!(results[0].0, 1);
    }

    #[test]
    fn test_batch_matches_single() {
        let backend = HashEmbeddingBackend::new(32);
        let texts = vec!["alpha beta".to_string(), "gamma".to_string()];
        let batch = backend.embed_batch(&texts).unwrap();
        assert_eq!(batch[0], backend.embed("alpha beta").unwrap());
        assert_eq!(batch[1], backend.embed("gamma").unwrap());
    }
}
