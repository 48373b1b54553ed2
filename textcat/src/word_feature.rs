//! Word-level feature extraction.

use std::io::{Read, Write};

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;
use tracing::info;

use crate::errors::{CategorizerError, Result};
use crate::serialization::{self, WORD_FEATURE_EXTRACTOR_TAG};
use crate::utils::SplitMix64Builder;

/// Number of shape flags appended after the embedding.
pub const NUM_SHAPE_FEATURES: usize = 4;

/// Maps a word to a dense feature vector.
///
/// Every vector returned by one extractor has [`num_dimensions()`](Self::num_dimensions)
/// components. Implementations are read-only after construction.
pub trait WordFeatureExtractor {
    /// Returns the length of the vectors produced by [`extract()`](Self::extract).
    fn num_dimensions(&self) -> usize;

    /// Computes the feature vector of a word.
    fn extract(&self, word: &str) -> Vec<f32>;
}

/// Word feature extractor combining a word embedding table with word shape features.
///
/// The output of [`extract()`](WordFeatureExtractor::extract) is the embedding of the word
/// followed by four flags:
///
/// 1. the first character is uppercase,
/// 2. the word has letters and all of them are uppercase,
/// 3. the word contains a numeric character,
/// 4. the word is not in the vocabulary.
///
/// Unknown words are looked up again in lowercase; if that also fails the embedding part is
/// zero.
#[derive(Clone, Debug)]
pub struct TotalWordFeatureExtractor {
    embedding_dims: usize,
    words: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    word_ids: HashMap<String, usize, SplitMix64Builder>,
}

impl TotalWordFeatureExtractor {
    /// Creates a new extractor.
    ///
    /// # Arguments
    ///
    /// * `embedding_dims` - The length of each embedding.
    /// * `words` - Vocabulary.
    /// * `embeddings` - The embedding of each word in `words`.
    ///
    /// # Errors
    ///
    /// If the lengths are inconsistent or a word appears twice, an error variant will be
    /// returned.
    pub fn new(
        embedding_dims: usize,
        words: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if words.len() != embeddings.len() {
            return Err(CategorizerError::invalid_argument(
                "embeddings",
                format!(
                    "{} embeddings given for {} words",
                    embeddings.len(),
                    words.len()
                ),
            ));
        }
        if let Some(i) = embeddings.iter().position(|e| e.len() != embedding_dims) {
            return Err(CategorizerError::invalid_argument(
                "embeddings",
                format!(
                    "embedding of {:?} has {} components, expected {}",
                    words[i],
                    embeddings[i].len(),
                    embedding_dims
                ),
            ));
        }
        let mut word_ids = HashMap::with_capacity_and_hasher(words.len(), SplitMix64Builder);
        for (i, word) in words.iter().enumerate() {
            if word_ids.insert(word.clone(), i).is_some() {
                return Err(CategorizerError::invalid_argument(
                    "words",
                    format!("duplicate word: {word:?}"),
                ));
            }
        }
        Ok(Self {
            embedding_dims,
            words,
            embeddings,
            word_ids,
        })
    }

    /// Returns the length of the embedding part.
    pub const fn embedding_dims(&self) -> usize {
        self.embedding_dims
    }

    /// Returns the number of words in the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the word has its own embedding.
    pub fn contains(&self, word: &str) -> bool {
        self.word_ids.contains_key(word)
    }

    fn lookup(&self, word: &str) -> Option<&[f32]> {
        let id = match self.word_ids.get(word) {
            Some(&id) => Some(id),
            None => self.word_ids.get(word.to_lowercase().as_str()).copied(),
        };
        id.map(|id| self.embeddings[id].as_slice())
    }

    /// Exports the extractor as a tagged artifact.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        serialization::write_tag(&mut wtr, WORD_FEATURE_EXTRACTOR_TAG)?;
        serialization::encode(self, &mut wtr)?;
        Ok(())
    }

    /// Reads an extractor from a tagged artifact.
    ///
    /// # Errors
    ///
    /// Returns `FormatMismatch` if the artifact holds something else, or the error of `rdr`.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        serialization::expect_tag(&mut rdr, WORD_FEATURE_EXTRACTOR_TAG)?;
        let fe: Self = serialization::decode(&mut rdr)?;
        info!(
            words = fe.vocabulary_size(),
            dims = fe.num_dimensions(),
            "loaded word feature extractor"
        );
        Ok(fe)
    }
}

impl WordFeatureExtractor for TotalWordFeatureExtractor {
    fn num_dimensions(&self) -> usize {
        self.embedding_dims + NUM_SHAPE_FEATURES
    }

    fn extract(&self, word: &str) -> Vec<f32> {
        let mut feats = Vec::with_capacity(self.num_dimensions());
        let embedding = self.lookup(word);
        match embedding {
            Some(e) => feats.extend_from_slice(e),
            None => feats.resize(self.embedding_dims, 0.),
        }

        let first_upper = word.chars().next().map_or(false, char::is_uppercase);
        let mut letters = word.chars().filter(|c| c.is_alphabetic()).peekable();
        let all_upper = letters.peek().is_some() && letters.all(char::is_uppercase);
        let has_digit = word.chars().any(char::is_numeric);
        for flag in [first_upper, all_upper, has_digit, embedding.is_none()] {
            feats.push(if flag { 1. } else { 0. });
        }
        feats
    }
}

impl Encode for TotalWordFeatureExtractor {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.embedding_dims, encoder)?;
        Encode::encode(&self.words, encoder)?;
        Encode::encode(&self.embeddings, encoder)?;
        Ok(())
    }
}

impl Decode for TotalWordFeatureExtractor {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let embedding_dims = Decode::decode(decoder)?;
        let words = Decode::decode(decoder)?;
        let embeddings = Decode::decode(decoder)?;
        Self::new(embedding_dims, words, embeddings)
            .map_err(|e| DecodeError::OtherString(e.to_string()))
    }
}
