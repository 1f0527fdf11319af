//! Nearest-neighbor index over document vectors
//!
//! Stores L2-normalized vectors plus their source text and serves ranked
//! cosine-similarity search. Two interchangeable backends share one
//! contract: a matrix-backed exact search (ndarray inner product, the
//! `IndexFlatIP` shape) and a plain linear scan that is always available.
//! Concurrent mutation must be serialized by the caller.

use crate::error::{MatcherError, Result};
use crate::processing::embeddings::l2_normalize;
use ndarray::{Array2, ArrayView1};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Backend selection at construction time. Both produce identical rankings
/// to floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    /// Matrix-backed exact search: one matrix-vector product per query.
    Flat,
    /// Row-by-row linear scan fallback.
    Linear,
}

trait VectorStore: Send {
    fn add(&mut self, rows: Vec<Vec<f32>>) -> Result<()>;
    fn scores(&self, query: &[f32]) -> Vec<f32>;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn rows(&self) -> Vec<Vec<f32>>;
}

struct FlatStore {
    dimension: usize,
    matrix: Array2<f32>,
}

impl FlatStore {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            matrix: Array2::zeros((0, dimension)),
        }
    }
}

impl VectorStore for FlatStore {
    fn add(&mut self, rows: Vec<Vec<f32>>) -> Result<()> {
        for row in rows {
            if row.len() != self.dimension {
                return Err(MatcherError::DimensionMismatch {
                    expected: self.dimension,
                    actual: row.len(),
                });
            }
            self.matrix
                .push_row(ArrayView1::from(row.as_slice()))
                .map_err(|e| MatcherError::Index(format!("Failed to append row: {}", e)))?;
        }
        Ok(())
    }

    fn scores(&self, query: &[f32]) -> Vec<f32> {
        self.matrix.dot(&ArrayView1::from(query)).to_vec()
    }

    fn clear(&mut self) {
        self.matrix = Array2::zeros((0, self.dimension));
    }

    fn len(&self) -> usize {
        self.matrix.nrows()
    }

    fn rows(&self) -> Vec<Vec<f32>> {
        self.matrix.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}

struct LinearStore {
    dimension: usize,
    rows: Vec<Vec<f32>>,
}

impl LinearStore {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: Vec::new(),
        }
    }
}

impl VectorStore for LinearStore {
    fn add(&mut self, rows: Vec<Vec<f32>>) -> Result<()> {
        for row in rows {
            if row.len() != self.dimension {
                return Err(MatcherError::DimensionMismatch {
                    expected: self.dimension,
                    actual: row.len(),
                });
            }
            self.rows.push(row);
        }
        Ok(())
    }

    fn scores(&self, query: &[f32]) -> Vec<f32> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(query.iter()).map(|(a, b)| a * b).sum())
            .collect()
    }

    fn clear(&mut self) {
        self.rows.clear();
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn rows(&self) -> Vec<Vec<f32>> {
        self.rows.clone()
    }
}

/// Vector index with a parallel text store.
pub struct VectorIndex {
    store: Box<dyn VectorStore>,
    documents: Vec<String>,
    dimension: usize,
}

impl VectorIndex {
    pub fn new(dimension: usize, backend: IndexBackend) -> Self {
        let store: Box<dyn VectorStore> = match backend {
            IndexBackend::Flat => Box::new(FlatStore::new(dimension)),
            IndexBackend::Linear => Box::new(LinearStore::new(dimension)),
        };
        Self {
            store,
            documents: Vec::new(),
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Add documents and their vectors. Vectors are L2-normalized on insert
    /// so search reduces to inner products.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, documents: Vec<String>) -> Result<()> {
        if vectors.len() != documents.len() {
            return Err(MatcherError::InvalidInput(format!(
                "Vector count {} does not match document count {}",
                vectors.len(),
                documents.len()
            )));
        }

        let normalized = vectors.iter().map(|v| l2_normalize(v)).collect();
        self.store.add(normalized)?;
        self.documents.extend(documents);
        Ok(())
    }

    /// Ranked search: descending cosine similarity, truncated to `top_k`
    /// results at or above `threshold`.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<(usize, f32, String)>> {
        if self.documents.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(MatcherError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let query = l2_normalize(query);
        let scores = self.store.scores(&query);

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().map(|(i, s)| (i, s)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(ranked
            .into_iter()
            .take(top_k)
            .filter(|(_, score)| *score >= threshold)
            .map(|(i, score)| (i, score, self.documents[i].clone()))
            .collect())
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.documents.clear();
    }

    /// Persist vectors (JSON) and documents (line-oriented, embedded
    /// newlines escaped) under `{path}.vec` / `{path}.docs`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let vec_file = File::create(with_suffix(path, ".vec"))?;
        serde_json::to_writer(BufWriter::new(vec_file), &self.store.rows())?;

        let docs_file = File::create(with_suffix(path, ".docs"))?;
        let mut writer = BufWriter::new(docs_file);
        for doc in &self.documents {
            writeln!(writer, "{}", doc.replace('\n', "\\n"))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a previously saved index into this one, replacing its contents.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let vec_file = File::open(with_suffix(path, ".vec"))?;
        let rows: Vec<Vec<f32>> = serde_json::from_reader(BufReader::new(vec_file))?;

        let docs_file = File::open(with_suffix(path, ".docs"))?;
        let mut documents = Vec::new();
        for line in BufReader::new(docs_file).lines() {
            documents.push(line?.replace("\\n", "\n"));
        }

        if rows.len() != documents.len() {
            return Err(MatcherError::Index(format!(
                "Stored vector count {} does not match document count {}",
                rows.len(),
                documents.len()
            )));
        }

        self.clear();
        self.add(rows, documents)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    std::path::PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vectors() -> (Vec<Vec<f32>>, Vec<String>) {
        (
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.9, 0.1, 0.0],
            ],
            vec![
                "x axis".to_string(),
                "y axis".to_string(),
                "mostly x".to_string(),
            ],
        )
    }

    fn behavioral_suite(backend: IndexBackend) {
        let mut index = VectorIndex::new(3, backend);
        let (vectors, documents) = sample_vectors();
        index.add(vectors, documents).unwrap();
        assert_eq!(index.size(), 3);

        // Ranked descending, best match first
        let results = index.search(&[1.0, 0.0, 0.0], 3, 0.0).unwrap();
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-5);
        assert_eq!(results[1].2, "mostly x");
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }

        // top_k truncation
        let results = index.search(&[1.0, 0.0, 0.0], 1, 0.0).unwrap();
        assert_eq!(results.len(), 1);

        // Threshold filtering
        let results = index.search(&[1.0, 0.0, 0.0], 3, 0.5).unwrap();
        assert!(results.iter().all(|(_, score, _)| *score >= 0.5));
        assert_eq!(results.len(), 2);

        // Dimension mismatch is a loud error
        assert!(matches!(
            index.search(&[1.0, 0.0], 3, 0.0),
            Err(MatcherError::DimensionMismatch { .. })
        ));

        // Clear empties the index
        index.clear();
        assert_eq!(index.size(), 0);
        assert!(index.search(&[1.0, 0.0, 0.0], 3, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_flat_backend_contract() {
        behavioral_suite(IndexBackend::Flat);
    }

    #[test]
    fn test_linear_backend_contract() {
        behavioral_suite(IndexBackend::Linear);
    }

    #[test]
    fn test_backends_agree_on_ranking() {
        let (vectors, documents) = sample_vectors();
        let mut flat = VectorIndex::new(3, IndexBackend::Flat);
        let mut linear = VectorIndex::new(3, IndexBackend::Linear);
        flat.add(vectors.clone(), documents.clone()).unwrap();
        linear.add(vectors, documents).unwrap();

        let query = [0.7, 0.3, 0.1];
        let a = flat.search(&query, 3, 0.0).unwrap();
        let b = linear.search(&query, 3, 0.0).unwrap();

        assert_eq!(a.len(), b.len());
        for (fa, fb) in a.iter().zip(b.iter()) {
            assert_eq!(fa.0, fb.0);
            assert!((fa.1 - fb.1).abs() < 1e-5);
        }
    }

    #[test]
    fn test_vector_document_count_mismatch() {
        let mut index = VectorIndex::new(3, IndexBackend::Linear);
        let result = index.add(vec![vec![1.0, 0.0, 0.0]], vec![]);
        assert!(matches!(result, Err(MatcherError::InvalidInput(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index");

        let mut index = VectorIndex::new(3, IndexBackend::Linear);
        index
            .add(
                vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
                vec!["line one\nline two".to_string(), "plain".to_string()],
            )
            .unwrap();
        index.save(&path).unwrap();

        // Load into the other backend; contract is identical
        let mut restored = VectorIndex::new(3, IndexBackend::Flat);
        restored.load(&path).unwrap();
        assert_eq!(restored.size(), 2);

        let results = restored.search(&[1.0, 0.0, 0.0], 1, 0.0).unwrap();
        assert_eq!(results[0].2, "line one\nline two");
    }
}
