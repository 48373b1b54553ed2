use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Encode;
use hashbrown::HashSet;
use tracing::{debug, info};

use crate::decision_function::{DecisionFunction, MulticlassLinearDecisionFunction};
use crate::errors::{CategorizerError, Result};
use crate::serialization::{self, CATEGORIZER_TAG, CATEGORIZER_VERSION, PURE_MODEL_TAG};
use crate::text_feature::{extract_text_features, sentence_to_feats};
use crate::utils;
use crate::word_feature::{TotalWordFeatureExtractor, WordFeatureExtractor};

const FINGERPRINT_SEED: u64 = 0x7465_7874_6361_7431;

/// Text categorizer.
///
/// Owns the tag names, a word feature extractor and a decision function. Tag `i` is the name of
/// label `i` of the decision function. Once created, a categorizer is never modified, so it can
/// be shared between threads.
#[derive(Clone)]
pub struct TextCategorizer<D = MulticlassLinearDecisionFunction, F = TotalWordFeatureExtractor> {
    tag_names: Vec<String>,
    fe: F,
    df: D,
    fingerprint: u64,
}

/// Checks that every tag can be predicted by `df`.
fn validate<D>(tag_names: &[String], df: &D) -> Result<()>
where
    D: DecisionFunction,
{
    if df.number_of_classes() == 0 {
        return Err(CategorizerError::invalid_model("the classifier has no classes"));
    }
    if df.number_of_classes() < tag_names.len() {
        return Err(CategorizerError::invalid_model(format!(
            "the classifier has {} classes but there are {} tags",
            df.number_of_classes(),
            tag_names.len()
        )));
    }
    let df_tags: HashSet<u32> = df.predictable_labels().iter().copied().collect();
    for (i, name) in tag_names.iter().enumerate() {
        let predictable = u32::try_from(i).map_or(false, |i| df_tags.contains(&i));
        if !predictable {
            return Err(CategorizerError::invalid_model(format!(
                "the classifier must be capable of predicting each possible tag as output, \
                 but tag {i} ({name:?}) is never predicted"
            )));
        }
    }
    Ok(())
}

fn compute_fingerprint<D, F>(tag_names: &[String], fe: &F, df: &D) -> Result<u64>
where
    D: Encode,
    F: Encode,
{
    let bytes = serialization::encode_to_vec(&(tag_names, fe, df))?;
    Ok(utils::hash_bytes(FINGERPRINT_SEED, &bytes))
}

impl<D, F> TextCategorizer<D, F>
where
    D: DecisionFunction + Encode,
    F: WordFeatureExtractor + Encode,
{
    /// Creates a new categorizer.
    ///
    /// # Arguments
    ///
    /// * `tag_names` - Tag names; the index of each name is its label.
    /// * `fe` - A word feature extractor.
    /// * `df` - A trained decision function.
    ///
    /// # Returns
    ///
    /// A new categorizer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidModel` if `df` has fewer classes than there are tags, or cannot output
    /// some label in `0..tag_names.len()`.
    pub fn new(tag_names: Vec<String>, fe: F, df: D) -> Result<Self> {
        validate(&tag_names, &df)?;
        let fingerprint = compute_fingerprint(&tag_names, &fe, &df)?;
        Ok(Self {
            tag_names,
            fe,
            df,
            fingerprint,
        })
    }
}

impl<D, F> TextCategorizer<D, F>
where
    D: DecisionFunction,
    F: WordFeatureExtractor,
{
    /// Predicts the tag of a sentence together with its score.
    ///
    /// # Arguments
    ///
    /// * `sentence` - Tokens of the sentence. May be empty.
    ///
    /// # Returns
    ///
    /// The label and the score of the best class. The label can be passed to
    /// [`tag_name()`](Self::tag_name).
    ///
    /// # Errors
    ///
    /// Returns an error only if the word feature extractor produces vectors of inconsistent
    /// length.
    pub fn predict_with_score<S>(&self, sentence: &[S]) -> Result<(u32, f64)>
    where
        S: AsRef<str>,
    {
        let feats = sentence_to_feats(&self.fe, sentence);
        let x = extract_text_features(sentence, &feats)?;
        let (tag, score) = self.df.predict(&x);
        debug!(tokens = sentence.len(), tag, score, "predicted");
        Ok((tag, score))
    }

    /// Predicts the tag of a sentence.
    ///
    /// # Errors
    ///
    /// See [`predict_with_score()`](Self::predict_with_score).
    pub fn predict<S>(&self, sentence: &[S]) -> Result<u32>
    where
        S: AsRef<str>,
    {
        self.predict_with_score(sentence).map(|(tag, _)| tag)
    }

    /// Gets the tag names.
    pub fn tag_names(&self) -> &[String] {
        &self.tag_names
    }

    /// Gets the name of a predicted label, if it has one.
    pub fn tag_name(&self, tag: u32) -> Option<&str> {
        self.tag_names
            .get(usize::try_from(tag).ok()?)
            .map(String::as_str)
    }

    pub fn num_tags(&self) -> usize {
        self.tag_names.len()
    }

    /// Gets the fingerprint identifying the tag names, the extractor and the decision function.
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub const fn decision_function(&self) -> &D {
        &self.df
    }

    pub const fn word_feature_extractor(&self) -> &F {
        &self.fe
    }
}

impl TextCategorizer {
    /// Creates a categorizer from a pure model artifact and a word feature extractor artifact.
    ///
    /// The format tag of each artifact is checked before its payload is read, and the loaded
    /// parts are validated the same way as [`TextCategorizer::new()`].
    ///
    /// # Arguments
    ///
    /// * `pure_model` - A data source holding the decision function and the tag names.
    /// * `extractor` - A data source holding the word feature extractor.
    ///
    /// # Errors
    ///
    /// Returns `FormatMismatch` if a tag is wrong, `InvalidModel` if the parts are
    /// inconsistent, or the error of the data source.
    pub fn from_readers<R, S>(mut pure_model: R, extractor: S) -> Result<Self>
    where
        R: Read,
        S: Read,
    {
        serialization::expect_tag(&mut pure_model, PURE_MODEL_TAG)?;
        let df: MulticlassLinearDecisionFunction = serialization::decode(&mut pure_model)?;
        let tag_names: Vec<String> = serialization::decode(&mut pure_model)?;
        let fe = TotalWordFeatureExtractor::read(extractor)?;
        let categorizer = Self::new(tag_names, fe, df)?;
        info!(
            tags = categorizer.num_tags(),
            classes = categorizer.df.number_of_classes(),
            fingerprint = categorizer.fingerprint,
            "loaded text categorizer"
        );
        Ok(categorizer)
    }

    /// Creates a categorizer from the paths of a pure model file and an extractor file.
    ///
    /// # Errors
    ///
    /// See [`from_readers()`](Self::from_readers). A missing file is reported as `IOError`.
    pub fn from_files<P, Q>(pure_model_path: P, extractor_path: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let pure_model = BufReader::new(File::open(pure_model_path)?);
        let extractor = BufReader::new(File::open(extractor_path)?);
        Self::from_readers(pure_model, extractor)
    }

    /// Exports the decision function and the tag names as a pure model artifact.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write_pure_model<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        serialization::write_tag(&mut wtr, PURE_MODEL_TAG)?;
        serialization::encode(&self.df, &mut wtr)?;
        serialization::encode(&self.tag_names, &mut wtr)?;
        Ok(())
    }

    /// Exports the word feature extractor as an extractor artifact.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write_extractor<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        self.fe.write(wtr)
    }

    /// Writes the two artifacts read by [`from_files()`](Self::from_files).
    ///
    /// # Errors
    ///
    /// Returns `IOError` if a file cannot be created or written.
    pub fn save_files<P, Q>(&self, pure_model_path: P, extractor_path: Q) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let mut wtr = BufWriter::new(File::create(pure_model_path)?);
        self.write_pure_model(&mut wtr)?;
        wtr.flush()?;

        let mut wtr = BufWriter::new(File::create(extractor_path)?);
        self.write_extractor(&mut wtr)?;
        wtr.flush()?;

        info!(fingerprint = self.fingerprint, "saved text categorizer");
        Ok(())
    }

    /// Exports the whole categorizer as one artifact.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        serialization::write_tag(&mut wtr, CATEGORIZER_TAG)?;
        serialization::encode(&CATEGORIZER_VERSION, &mut wtr)?;
        serialization::encode(&self.fingerprint, &mut wtr)?;
        serialization::encode(&self.tag_names, &mut wtr)?;
        serialization::encode(&self.fe, &mut wtr)?;
        serialization::encode(&self.df, &mut wtr)?;
        Ok(())
    }

    /// Reads a categorizer written by [`write()`](Self::write).
    ///
    /// # Errors
    ///
    /// Returns `FormatMismatch` if the tag is wrong, `InvalidModel` if the version is unknown,
    /// the parts are inconsistent, or the stored fingerprint does not match the content.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        serialization::expect_tag(&mut rdr, CATEGORIZER_TAG)?;
        let version: u32 = serialization::decode(&mut rdr)?;
        if version != CATEGORIZER_VERSION {
            return Err(CategorizerError::invalid_model(format!(
                "unsupported version of {CATEGORIZER_TAG}: {version}"
            )));
        }
        let fingerprint: u64 = serialization::decode(&mut rdr)?;
        let tag_names: Vec<String> = serialization::decode(&mut rdr)?;
        let fe: TotalWordFeatureExtractor = serialization::decode(&mut rdr)?;
        let df: MulticlassLinearDecisionFunction = serialization::decode(&mut rdr)?;
        let categorizer = Self::new(tag_names, fe, df)?;
        if categorizer.fingerprint != fingerprint {
            return Err(CategorizerError::invalid_model(
                "the stored fingerprint does not match the model",
            ));
        }
        info!(
            tags = categorizer.num_tags(),
            classes = categorizer.df.number_of_classes(),
            fingerprint,
            "loaded text categorizer"
        );
        Ok(categorizer)
    }
}
