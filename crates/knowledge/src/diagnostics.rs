//! Similarity diagnostics between probe questions and known questions.

use qaroute_core::Embedding;

/// Pairwise scores: one row per probe, one column per known question.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    /// Probe texts (rows)
    pub probes: Vec<String>,

    /// Known questions (columns)
    pub known: Vec<String>,

    /// Row-major scores
    pub values: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// Cosine similarity of every probe against every known question.
    pub fn cosine(
        probes: &[String],
        probe_vectors: &[Embedding],
        known: &[String],
        known_vectors: &[Embedding],
    ) -> Self {
        Self::build(probes, probe_vectors, known, known_vectors, cosine_similarity)
    }

    /// Euclidean distance of every probe to every known question.
    pub fn euclidean(
        probes: &[String],
        probe_vectors: &[Embedding],
        known: &[String],
        known_vectors: &[Embedding],
    ) -> Self {
        Self::build(probes, probe_vectors, known, known_vectors, euclidean_distance)
    }

    fn build(
        probes: &[String],
        probe_vectors: &[Embedding],
        known: &[String],
        known_vectors: &[Embedding],
        metric: fn(&[f32], &[f32]) -> f32,
    ) -> Self {
        let values = probe_vectors
            .iter()
            .map(|p| {
                known_vectors
                    .iter()
                    .map(|k| metric(p.as_slice(), k.as_slice()))
                    .collect()
            })
            .collect();

        Self {
            probes: probes.to_vec(),
            known: known.to_vec(),
            values,
        }
    }

    /// Known question with the highest score for a probe row.
    ///
    /// Ties keep the earliest column. Use on cosine matrices.
    pub fn nearest(&self, row: usize) -> Option<(&str, f32)> {
        let scores = self.values.get(row)?;
        let mut best: Option<(usize, f32)> = None;
        for (col, &score) in scores.iter().enumerate() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((col, score));
            }
        }
        best.and_then(|(col, score)| self.known.get(col).map(|k| (k.as_str(), score)))
    }
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Euclidean distance over the shared prefix of two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 1.0);

        let c = vec![0.0, 1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &c), 0.0);

        let d = vec![0.5, 0.5, 0.0];
        let similarity = cosine_similarity(&a, &d);
        assert!(similarity > 0.7 && similarity < 0.71);

        assert_eq!(cosine_similarity(&[], &a), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &a), 0.0);
    }

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_matrix_nearest() {
        let known = vec!["What does EVA do?".to_string(), "How does PHIL work?".to_string()];
        let known_vectors = vec![Embedding(vec![1.0, 0.0]), Embedding(vec![0.0, 1.0])];
        let probes = vec!["EVA?".to_string(), "PHIL?".to_string()];
        let probe_vectors = vec![Embedding(vec![0.9, 0.1]), Embedding(vec![0.2, 0.8])];

        let matrix = SimilarityMatrix::cosine(&probes, &probe_vectors, &known, &known_vectors);
        assert_eq!(matrix.values.len(), 2);
        assert_eq!(matrix.values[0].len(), 2);
        assert_eq!(matrix.nearest(0).unwrap().0, "What does EVA do?");
        assert_eq!(matrix.nearest(1).unwrap().0, "How does PHIL work?");
        assert!(matrix.nearest(2).is_none());

        let distances =
            SimilarityMatrix::euclidean(&probes, &probe_vectors, &known, &known_vectors);
        assert!(distances.values[0][0] < distances.values[0][1]);
    }
}
