//! Answer grading by semantic similarity.
//!
//! A quiz answer is accepted when the cosine similarity between its sentence
//! embedding and the embedding of the stored definition is strictly greater
//! than [`SIMILARITY_THRESHOLD`].

pub mod embedder;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

pub use embedder::{Embedder, FastEmbedder};

/// Minimum similarity (exclusive) for an answer to count as correct.
pub const SIMILARITY_THRESHOLD: f32 = 0.75;

/// Outcome of grading one answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grade {
    pub score: f32,
    pub correct: bool,
}

impl Grade {
    pub fn from_score(score: f32) -> Self {
        Grade {
            score,
            correct: score > SIMILARITY_THRESHOLD,
        }
    }

    /// Grade given when an answer could not be embedded.
    pub fn zero() -> Self {
        Grade::from_score(0.0)
    }
}

/// Shared, cheaply clonable handle to the loaded embedding model.
#[derive(Clone)]
pub struct Grader {
    embedder: Arc<dyn Embedder>,
}

impl Grader {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Grader { embedder }
    }

    /// Scores `answer` against `reference`. Never fails: anything that keeps the
    /// pair from being embedded yields a zero grade.
    pub fn grade(&self, answer: &str, reference: &str) -> Grade {
        let answer = answer.trim();
        let reference = reference.trim();

        if answer.is_empty() || reference.is_empty() {
            debug!("Empty answer or reference, grading as incorrect");
            return Grade::zero();
        }

        let vectors = match self.embedder.embed(&[answer, reference]) {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!("Failed to embed quiz answer: {:#}", e);
                return Grade::zero();
            }
        };

        match vectors.as_slice() {
            [a, b] => Grade::from_score(cosine_similarity(a, b)),
            other => {
                warn!("Embedding model returned {} vectors for 2 inputs", other.len());
                Grade::zero()
            }
        }
    }

    /// Grades each `(answer, reference)` pair in order.
    pub fn grade_all<A, R>(&self, pairs: &[(A, R)]) -> Vec<Grade>
    where
        A: AsRef<str>,
        R: AsRef<str>,
    {
        pairs
            .iter()
            .map(|(answer, reference)| self.grade(answer.as_ref(), reference.as_ref()))
            .collect()
    }
}

/// Cosine similarity of two vectors; 0.0 for empty, mismatched or zero-length input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (dot_product / denominator).clamp(-1.0, 1.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    /// Bag-of-words embedder: each lowercase word bumps one of 64 buckets.
    pub(crate) struct WordBagEmbedder;

    impl Embedder for WordBagEmbedder {
        fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut vector = vec![0.0f32; 64];
                    for word in text.split_whitespace() {
                        let mut hasher = DefaultHasher::new();
                        word.to_lowercase().hash(&mut hasher);
                        vector[(hasher.finish() % 64) as usize] += 1.0;
                    }
                    vector
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            anyhow::bail!("model not loaded")
        }
    }

    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn embed(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    fn word_bag_grader() -> Grader {
        Grader::new(Arc::new(WordBagEmbedder))
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        // Scale does not matter
        let e = vec![3.0, 4.0];
        let f = vec![6.0, 8.0];
        assert!((cosine_similarity(&e, &f) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!Grade::from_score(SIMILARITY_THRESHOLD).correct);
        assert!(Grade::from_score(0.7501).correct);
        assert!(!Grade::from_score(-1.0).correct);
        assert_eq!(Grade::zero(), Grade { score: 0.0, correct: false });
    }

    #[test]
    fn test_identical_answers_are_correct() {
        let grade = word_bag_grader().grade("Cell division", "Cell division");
        assert!((grade.score - 1.0).abs() < 0.001);
        assert!(grade.correct);
    }

    #[test]
    fn test_case_insensitive_answer_is_correct() {
        let grade = word_bag_grader().grade("cell division", "Cell division");
        assert!(grade.correct);
    }

    #[test]
    fn test_unrelated_answer_is_incorrect() {
        let grade = word_bag_grader().grade("photosynthesis", "Cell division");
        assert!(!grade.correct);
    }

    #[test]
    fn test_empty_answer_scores_zero() {
        let grader = word_bag_grader();
        assert_eq!(grader.grade("", "Cell division"), Grade::zero());
        assert_eq!(grader.grade("   ", "Cell division"), Grade::zero());
        assert_eq!(grader.grade("cell division", ""), Grade::zero());
    }

    #[test]
    fn test_embedder_failure_scores_zero() {
        let grader = Grader::new(Arc::new(FailingEmbedder));
        assert_eq!(grader.grade("cell division", "Cell division"), Grade::zero());

        let grader = Grader::new(Arc::new(ShortEmbedder));
        assert_eq!(grader.grade("cell division", "Cell division"), Grade::zero());
    }

    #[test]
    fn test_grade_all_keeps_order() {
        let grades = word_bag_grader().grade_all(&[
            ("cell division", "Cell division"),
            ("", "Cell division"),
            ("glucose", "Cell division"),
        ]);
        assert_eq!(grades.len(), 3);
        assert!(grades[0].correct);
        assert_eq!(grades[1], Grade::zero());
        assert!(!grades[2].correct);
    }

    #[test]
    #[ignore = "downloads the all-MiniLM-L6-v2 model"]
    fn test_sentence_model_grades_paraphrase() {
        let embedder = FastEmbedder::new(&crate::config::EmbeddingConfig::default())
            .expect("model should load");
        let grader = Grader::new(Arc::new(embedder));

        assert!(grader.grade("cell division", "Cell division").correct);
        assert!(!grader.grade("The capital of France", "Cell division").correct);
    }
}
