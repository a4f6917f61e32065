//! Feature-hashing provider.
//!
//! Hashes unigrams and adjacent-word bigrams into fixed-dimension signed
//! buckets, weighted by term frequency. Deterministic and dependency-free,
//! so identical text always maps to the identical vector.

use std::collections::BTreeMap;

use folio_core::errors::FolioResult;
use folio_core::traits::IEmbeddingProvider;

use crate::dimensions::l2_normalize;

/// Weight of a bigram relative to a unigram.
const BIGRAM_WEIGHT: f32 = 0.5;

pub struct HashingProvider {
    dimensions: usize,
}

impl HashingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// FNV-1a over the term bytes.
    fn hash_term(term: &str) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    /// Lowercase alphanumeric terms of two or more characters.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: BTreeMap<String, f32> = BTreeMap::new();
        for tok in &tokens {
            *tf.entry(tok.clone()).or_default() += 1.0;
        }
        for pair in tokens.windows(2) {
            *tf.entry(format!("{} {}", pair[0], pair[1])).or_default() += BIGRAM_WEIGHT;
        }

        let total = tokens.len() as f32;
        for (term, weight) in &tf {
            // Longer terms are rarer; damp very short ones.
            let idf = 1.0 + (term.chars().count() as f32).ln();
            let h = Self::hash_term(term);
            let bucket = (h % self.dimensions as u64) as usize;
            // The top bit picks the sign so collisions tend to cancel.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign * (weight / total) * idf;
        }

        l2_normalize(&mut vec);
        vec
    }
}

impl IEmbeddingProvider for HashingProvider {
    fn embed(&self, text: &str) -> FolioResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn empty_text_returns_zero_vector() {
        let p = HashingProvider::new(128);
        let v = p.embed("").unwrap();
        assert_eq!(v.len(), 128);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn output_is_unit_length() {
        let p = HashingProvider::new(256);
        let v = p.embed("the ship sailed past the lighthouse at dusk").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[test]
    fn deterministic() {
        let p = HashingProvider::new(384);
        assert_eq!(
            p.embed("chapter one begins").unwrap(),
            p.embed("chapter one begins").unwrap()
        );
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let p = HashingProvider::new(384);
        assert_eq!(
            p.embed("The Gates, opened!").unwrap(),
            p.embed("the gates opened").unwrap()
        );
    }

    #[test]
    fn overlapping_texts_are_closer() {
        let p = HashingProvider::new(384);
        let a = p.embed("the knight rode toward the northern castle").unwrap();
        let b = p.embed("the knight rode toward the castle gates").unwrap();
        let c = p.embed("bake the bread at high temperature").unwrap();
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }

    #[test]
    fn batch_matches_individual() {
        let p = HashingProvider::new(64);
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let batch = p.embed_batch(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], p.embed(text).unwrap());
        }
    }
}
