#![cfg_attr(docsrs, feature(doc_cfg))]

//! # textcat
//!
//! Categorizes tokenized sentences with a multiclass linear classifier over features derived
//! from word vectors.
//!
//! ## Examples
//!
//! ```no_run
//! use std::io::{stdin, BufRead};
//!
//! use textcat::TextCategorizer;
//!
//! let categorizer =
//!     TextCategorizer::from_files("text_categorizer.dat", "total_word_feature_extractor.dat")
//!         .unwrap();
//!
//! for line in stdin().lock().lines() {
//!     let line = line.unwrap();
//!     let tokens: Vec<&str> = line.split_whitespace().collect();
//!     let (tag, score) = categorizer.predict_with_score(&tokens).unwrap();
//!     println!("{}\t{}", categorizer.tag_name(tag).unwrap_or("<unnamed>"), score);
//! }
//! ```

mod utils;

mod categorizer;
mod decision_function;
pub mod errors;
pub mod serialization;
mod text_feature;
mod word_feature;

pub use categorizer::TextCategorizer;
pub use decision_function::{DecisionFunction, MulticlassLinearDecisionFunction};
pub use text_feature::{
    extract_text_features, hashed_feature_range, sentence_to_feats, SparseVector,
    HASHED_FEATURE_BUCKETS,
};
pub use word_feature::{TotalWordFeatureExtractor, WordFeatureExtractor, NUM_SHAPE_FEATURES};
