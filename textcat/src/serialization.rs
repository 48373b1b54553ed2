//! Tagged binary artifacts.
//!
//! Every artifact starts with a format tag string naming its logical type.
//! Readers check the tag before touching the payload. A change to the payload
//! layout gets a new tag string; existing tags are never reused.

use std::io::{Read, Write};

use bincode::{config, Decode, Encode};

use crate::errors::{CategorizerError, Result};

/// Tag of the artifact holding a decision function and its label table.
pub const PURE_MODEL_TAG: &str = "mitie::text_categorizer_extractor_pure_model";

/// Tag of the artifact holding a word feature extractor.
pub const WORD_FEATURE_EXTRACTOR_TAG: &str = "mitie::total_word_feature_extractor";

/// Tag of the single-file artifact holding a whole categorizer.
pub const CATEGORIZER_TAG: &str = "mitie::text_categorizer_extractor";

/// Version written after [`CATEGORIZER_TAG`].
pub const CATEGORIZER_VERSION: u32 = 2;

/// The most bytes a reader decodes for one artifact section.
///
/// Length prefixes are checked against this before anything is allocated, so a corrupt file
/// fails with a decode error.
pub const MAX_SECTION_BYTES: usize = 1 << 30;

/// The most bytes a format tag may take.
pub const MAX_TAG_BYTES: usize = 4096;

pub(crate) fn config() -> config::Configuration {
    config::standard()
}

fn tag_config() -> impl config::Config {
    config::standard().with_limit::<{ MAX_TAG_BYTES }>()
}

fn section_config() -> impl config::Config {
    config::standard().with_limit::<{ MAX_SECTION_BYTES }>()
}

pub(crate) fn write_tag<W>(wtr: &mut W, tag: &'static str) -> Result<()>
where
    W: Write,
{
    bincode::encode_into_std_write(tag, wtr, config())?;
    Ok(())
}

/// Reads the leading tag and fails with `FormatMismatch` unless it equals `expected`.
pub(crate) fn expect_tag<R>(rdr: &mut R, expected: &'static str) -> Result<()>
where
    R: Read,
{
    let found: String = bincode::decode_from_std_read(rdr, tag_config())?;
    if found != expected {
        return Err(CategorizerError::format_mismatch(expected, found));
    }
    Ok(())
}

pub(crate) fn encode<T, W>(val: &T, wtr: &mut W) -> Result<()>
where
    T: Encode,
    W: Write,
{
    bincode::encode_into_std_write(val, wtr, config())?;
    Ok(())
}

pub(crate) fn encode_to_vec<T>(val: &T) -> Result<Vec<u8>>
where
    T: Encode,
{
    Ok(bincode::encode_to_vec(val, config())?)
}

pub(crate) fn decode<T, R>(rdr: &mut R) -> Result<T>
where
    T: Decode,
    R: Read,
{
    Ok(bincode::decode_from_std_read(rdr, section_config())?)
}
