//! The process-wide default encoder.
//!
//! Resources come from the build (`TOKENBUDGET_DATA` at compile time) or, when
//! nothing was embedded, from the directory named by `TOKENBUDGET_DATA` at
//! runtime. Loading happens once; a failure is cached and returned to every
//! caller.

use std::sync::OnceLock;

use log::debug;

use crate::bpe::BpeEncoder;
use crate::error::{Error, Result};

mod embedded {
    include!(concat!(env!("OUT_DIR"), "/embedded_data.rs"));
}

pub const DATA_ENV: &str = "TOKENBUDGET_DATA";

static DEFAULT: OnceLock<Result<BpeEncoder>> = OnceLock::new();

pub fn default_encoder() -> Result<&'static BpeEncoder> {
    DEFAULT.get_or_init(load_default).as_ref().map_err(Clone::clone)
}

/// Whether tokenizer data was compiled into the binary.
pub fn is_embedded() -> bool {
    embedded::TOKENS.is_some() && embedded::MERGES.is_some()
}

fn load_default() -> Result<BpeEncoder> {
    if let (Some(tokens), Some(merges)) = (embedded::TOKENS, embedded::MERGES) {
        debug!("using embedded tokenizer data");
        return BpeEncoder::from_resources(tokens, merges);
    }
    match std::env::var_os(DATA_ENV) {
        Some(dir) => BpeEncoder::from_dir(dir),
        None => Err(Error::MissingData),
    }
}
