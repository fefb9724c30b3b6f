//! GPT-3 byte-level BPE tokenizer and chat token budgeting.
//!
//! The free functions take a `model` name for forward compatibility; every
//! model currently shares one vocabulary, loaded once through
//! [`default_encoder`]. Use [`BpeEncoder`] and [`TokenBudget`] directly to
//! work with another vocabulary.

pub mod bpe;
pub mod budget;
pub mod byte_level;
pub mod chat;
pub mod data;
pub mod error;
pub mod merges;
pub mod model;
pub mod split;
pub mod vocab;

#[doc(hidden)]
pub mod testing;

pub use bpe::BpeEncoder;
pub use budget::{BudgetConfig, Fit, TokenBudget, Trimmed};
pub use chat::{Msg, Role};
pub use data::default_encoder;
pub use error::{Error, Result};
pub use model::max_tokens;

fn default_budget() -> Result<TokenBudget<'static>> {
    default_encoder().map(TokenBudget::new)
}

pub fn token_count(text: &str, _model: &str) -> Result<usize> {
    Ok(default_encoder()?.count_tokens(text))
}

pub fn encode(text: &str, _model: &str) -> Result<Vec<u32>> {
    Ok(default_encoder()?.encode(text))
}

pub fn decode(ids: &[u32], _model: &str) -> Result<String> {
    default_encoder()?.decode(ids)
}

pub fn message_token_count(msg: &Msg, _model: &str) -> Result<usize> {
    Ok(default_budget()?.message_token_count(msg))
}

pub fn chat_token_count(messages: &[Msg], _model: &str) -> Result<usize> {
    Ok(default_budget()?.chat_token_count(messages))
}

/// See [`TokenBudget::fit_context`].
pub fn fit_context<'m>(candidates: &'m [Msg], budget: usize, _model: &str) -> Result<Fit<'m>> {
    Ok(default_budget()?.fit_context(candidates, budget))
}

/// See [`TokenBudget::drop_history_if_needed`].
pub fn drop_history_if_needed(
    chat: Vec<Msg>,
    fixed_suffix_len: usize,
    budget: usize,
    _model: &str,
) -> Result<Trimmed> {
    Ok(default_budget()?.drop_history_if_needed(chat, fixed_suffix_len, budget))
}
