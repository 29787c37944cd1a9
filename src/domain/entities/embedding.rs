use serde::{Deserialize, Serialize};

/// Dense vector produced by an embedding model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn new(vec: Vec<f32>) -> Self {
        Self(vec)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine similarity in `[-1, 1]`; zero for mismatched or degenerate vectors.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return 0.0;
        }

        let (norm_a, norm_b) = (self.norm(), other.norm());
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        let dot: f32 = self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum();
        dot / (norm_a * norm_b)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vec: Vec<f32>) -> Self {
        Self(vec)
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(vec: Vec<f64>) -> Self {
        Self(vec.into_iter().map(|x| x as f32).collect())
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_of_parallel_vectors() {
        let a = Embedding::new(vec![1.0, 2.0, 3.0]);
        let b = Embedding::new(vec![2.0, 4.0, 6.0]);
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        let a = Embedding::new(vec![1.0, 0.0]);
        assert_eq!(a.cosine_similarity(&Embedding::new(vec![1.0])), 0.0);
        assert_eq!(a.cosine_similarity(&Embedding::new(vec![0.0, 0.0])), 0.0);
        assert_eq!(Embedding::new(vec![]).cosine_similarity(&Embedding::new(vec![])), 0.0);
    }

    #[test]
    fn test_from_f64() {
        let e: Embedding = vec![0.5f64, 1.5].into();
        assert_eq!(e.as_slice(), &[0.5, 1.5]);
    }
}
