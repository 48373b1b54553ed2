//! Sentence-level feature extraction.

use std::ops::Range;

use crate::errors::{CategorizerError, Result};
use crate::utils;
use crate::word_feature::WordFeatureExtractor;

/// The number of buckets the hashed n-gram features are folded into.
pub const HASHED_FEATURE_BUCKETS: u32 = 1 << 16;

const UNIGRAM_SEED: u64 = 0;
const BIGRAM_SEED: u64 = 1;

/// Sparse feature vector.
///
/// Entries are sorted by index and every index appears at most once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f64)>,
}

impl SparseVector {
    /// Creates a sparse vector from arbitrary `(index, value)` pairs.
    ///
    /// Pairs are sorted by index and values sharing an index are summed.
    /// Entries whose sum is zero are dropped.
    pub fn from_pairs(mut pairs: Vec<(u32, f64)>) -> Self {
        pairs.sort_by_key(|&(idx, _)| idx);
        let mut entries: Vec<(u32, f64)> = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            match entries.last_mut() {
                Some((last_idx, last_value)) if *last_idx == idx => *last_value += value,
                _ => entries.push((idx, value)),
            }
        }
        entries.retain(|&(_, value)| value != 0.);
        Self { entries }
    }

    /// Returns the sorted entries.
    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    /// Returns the value stored at `idx`, or zero.
    pub fn get(&self, idx: u32) -> f64 {
        self.entries
            .binary_search_by_key(&idx, |&(i, _)| i)
            .map_or(0., |pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product against a dense weight row. Indices past the end of `weights` count as zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        let mut y = 0.;
        for &(idx, value) in &self.entries {
            if let Some(w) = weights.get(idx as usize) {
                y += w * value;
            }
        }
        y
    }
}

/// Returns the index range occupied by hashed n-gram features when the word vectors have `dims`
/// components.
///
/// # Errors
///
/// If the range does not fit in `u32` indices, an error variant will be returned.
pub fn hashed_feature_range(dims: usize) -> Result<Range<u32>> {
    u32::try_from(dims)
        .ok()
        .and_then(|start| Some(start..start.checked_add(HASHED_FEATURE_BUCKETS)?))
        .ok_or_else(|| {
            CategorizerError::invalid_argument(
                "feats",
                format!("{dims} dimensional word vectors leave no room for hashed features"),
            )
        })
}

fn hashed_index(start: u32, seed: u64, text: &str) -> u32 {
    let bucket = utils::hash_bytes(seed, text.as_bytes()) % u64::from(HASHED_FEATURE_BUCKETS);
    // bucket < HASHED_FEATURE_BUCKETS, and start + HASHED_FEATURE_BUCKETS fits in u32
    start + bucket as u32
}

/// Runs the word feature extractor over each token.
pub fn sentence_to_feats<F, S>(fe: &F, words: &[S]) -> Vec<Vec<f32>>
where
    F: WordFeatureExtractor + ?Sized,
    S: AsRef<str>,
{
    words.iter().map(|w| fe.extract(w.as_ref())).collect()
}

/// Reduces a sentence to a single sparse vector.
///
/// Indices `0..D` hold the mean of the word vectors. Lowercased unigrams and adjacent bigrams
/// are hashed into [`hashed_feature_range`]`(D)`, each occurrence counting 1.
///
/// # Arguments
///
/// * `words` - Tokens of the sentence.
/// * `feats` - One word vector per token, all of the same length.
///
/// # Errors
///
/// If `words` and `feats` differ in length, or the word vectors differ in length, an error
/// variant will be returned.
pub fn extract_text_features<S>(words: &[S], feats: &[Vec<f32>]) -> Result<SparseVector>
where
    S: AsRef<str>,
{
    if words.len() != feats.len() {
        return Err(CategorizerError::invalid_argument(
            "feats",
            format!(
                "{} word vectors given for {} words",
                feats.len(),
                words.len()
            ),
        ));
    }
    let Some(first) = feats.first() else {
        return Ok(SparseVector::default());
    };
    let dims = first.len();
    let hashed_start = hashed_feature_range(dims)?.start;

    let mut total = vec![0f64; dims];
    for feat in feats {
        if feat.len() != dims {
            return Err(CategorizerError::invalid_argument(
                "feats",
                "word vectors must share one dimensionality",
            ));
        }
        for (t, &f) in total.iter_mut().zip(feat) {
            *t += f64::from(f);
        }
    }
    let n = feats.len() as f64;

    let mut pairs = Vec::with_capacity(dims + words.len() * 2);
    for (i, t) in total.into_iter().enumerate() {
        pairs.push((i as u32, t / n));
    }

    let lowered: Vec<String> = words.iter().map(|w| w.as_ref().to_lowercase()).collect();
    for w in &lowered {
        pairs.push((hashed_index(hashed_start, UNIGRAM_SEED, w), 1.));
    }
    for pair in lowered.windows(2) {
        let bigram = format!("{} {}", pair[0], pair[1]);
        pairs.push((hashed_index(hashed_start, BIGRAM_SEED, &bigram), 1.));
    }

    Ok(SparseVector::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(vec![(5, 1.), (2, 0.5), (5, 2.), (7, 0.)]);

        assert_eq!(&[(2, 0.5), (5, 3.)], v.entries());
        assert_eq!(3., v.get(5));
        assert_eq!(0., v.get(7));
    }

    #[test]
    fn test_from_pairs_drops_cancelled_entries() {
        let v = SparseVector::from_pairs(vec![(1, 1.), (1, -1.), (3, 2.)]);

        assert_eq!(&[(3, 2.)], v.entries());
    }

    #[test]
    fn test_dot_ignores_out_of_range_indices() {
        let v = SparseVector::from_pairs(vec![(0, 2.), (1, 3.), (100, 4.)]);

        assert_eq!(2. * 0.5 + 3. * 1., v.dot(&[0.5, 1.]));
    }

    #[test]
    fn test_extract_empty_sentence() {
        let words: [&str; 0] = [];
        let v = extract_text_features(&words, &[]).unwrap();

        assert!(v.is_empty());
    }

    #[test]
    fn test_extract_mean_of_word_vectors() {
        let words = ["a", "b"];
        let feats = vec![vec![1., 0., 2.], vec![3., 0., 0.]];
        let v = extract_text_features(&words, &feats).unwrap();

        assert_eq!(2., v.get(0));
        assert_eq!(0., v.get(1));
        assert_eq!(1., v.get(2));

        let hashed = hashed_feature_range(3).unwrap();
        let n_hashed: f64 = v
            .entries()
            .iter()
            .filter(|(i, _)| hashed.contains(i))
            .map(|(_, value)| value)
            .sum();
        // two unigrams and one bigram
        assert_eq!(3., n_hashed);
    }

    #[test]
    fn test_extract_is_case_insensitive_for_hashed_features() {
        let feats = vec![vec![0.], vec![0.]];
        let lower = extract_text_features(&["stock", "market"], &feats).unwrap();
        let upper = extract_text_features(&["Stock", "MARKET"], &feats).unwrap();

        assert_eq!(lower, upper);
    }

    #[test]
    fn test_extract_repeated_word_counts() {
        let feats = vec![vec![0.]; 3];
        let v = extract_text_features(&["go", "go", "go"], &feats).unwrap();

        let unigram = hashed_index(1, UNIGRAM_SEED, "go");
        let bigram = hashed_index(1, BIGRAM_SEED, "go go");
        if unigram == bigram {
            assert_eq!(5., v.get(unigram));
        } else {
            assert_eq!(3., v.get(unigram));
            assert_eq!(2., v.get(bigram));
        }
    }

    #[test]
    fn test_extract_is_order_sensitive_through_bigrams() {
        let feats = vec![vec![1.], vec![1.]];
        let ab = extract_text_features(&["a", "b"], &feats).unwrap();
        let ba = extract_text_features(&["b", "a"], &feats).unwrap();

        assert_eq!(ab.get(0), ba.get(0));
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_hashed_feature_range() {
        assert_eq!(3..3 + HASHED_FEATURE_BUCKETS, hashed_feature_range(3).unwrap());

        let last = (u32::MAX - HASHED_FEATURE_BUCKETS) as usize;
        assert_eq!(u32::MAX, hashed_feature_range(last).unwrap().end);
    }

    #[test]
    fn test_hashed_feature_range_overflow() {
        let too_many = (u32::MAX - HASHED_FEATURE_BUCKETS + 1) as usize;

        assert!(matches!(
            hashed_feature_range(too_many),
            Err(CategorizerError::InvalidArgument(_))
        ));
        assert!(matches!(
            hashed_feature_range(u32::MAX as usize),
            Err(CategorizerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_extract_length_mismatch() {
        let err = extract_text_features(&["a", "b"], &[vec![0.]]).unwrap_err();

        assert!(matches!(err, CategorizerError::InvalidArgument(_)));
    }

    #[test]
    fn test_extract_dimension_mismatch() {
        let err = extract_text_features(&["a", "b"], &[vec![0.], vec![0., 1.]]).unwrap_err();

        assert!(matches!(err, CategorizerError::InvalidArgument(_)));
    }
}
