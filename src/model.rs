//! Model names and context window sizes.
//!
//! Every model shares the same tokenizer; the name only matters for
//! [`max_tokens`].

use std::sync::LazyLock;

use fancy_regex::Regex;

pub const GPT4_TURBO: &str = "gpt-4-turbo";
pub const GPT4_TURBO_PREVIEW: &str = "gpt-4-turbo-preview";
pub const GPT4: &str = "gpt-4";
pub const GPT4_32K: &str = "gpt-4-32k";
pub const GPT35_TURBO: &str = "gpt-3.5-turbo";
pub const TEXT_DAVINCI_003: &str = "text-davinci-003";
pub const DAVINCI: &str = "davinci";
pub const EMBEDDING_3_LARGE: &str = "text-embedding-3-large";
pub const EMBEDDING_3_SMALL: &str = "text-embedding-3-small";
pub const EMBEDDING_ADA_002: &str = "text-embedding-ada-002";

pub const DEFAULT_CHAT: &str = GPT4_TURBO;

/// Dated snapshot names and the generic model each one belongs to.
static SNAPSHOTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^gpt-4-turbo-\d{4}-\d{2}-\d{2}$", GPT4_TURBO),
        (r"^gpt-3\.5-turbo-\d{4}$", GPT35_TURBO),
        (r"^gpt-4-32k-\d{4}$", GPT4_32K),
        (r"^gpt-4-\d{4}$", GPT4),
    ]
    .into_iter()
    .map(|(pat, model)| (Regex::new(pat).expect("invalid snapshot regex"), model))
    .collect()
});

/// Maximum prompt plus completion tokens for `model`, or `None` if the name
/// is not recognised.
///
/// Fine-tuned models (`base:ft-...`) and dated snapshots resolve to their
/// base model.
pub fn max_tokens(model: &str) -> Option<usize> {
    match model {
        "ada" | "babbage" | "curie" | DAVINCI | "text-ada-001" | "text-babbage-001"
        | "text-curie-001" => Some(2048),
        "code-davinci-002" | "text-davinci-002" => Some(4000),
        TEXT_DAVINCI_003 => Some(4097),
        GPT35_TURBO => Some(4096),
        GPT4 => Some(8192),
        GPT4_32K => Some(32768),
        GPT4_TURBO | GPT4_TURBO_PREVIEW | "gpt-4-1106-preview" | "gpt-4-0125-preview" => {
            Some(128_000)
        }
        EMBEDDING_ADA_002 | EMBEDDING_3_SMALL | EMBEDDING_3_LARGE => Some(8192),
        _ => {
            if let Some((base, _)) = model.split_once(":ft-") {
                return max_tokens(base);
            }
            snapshot_to_generic(model).and_then(max_tokens)
        }
    }
}

fn snapshot_to_generic(model: &str) -> Option<&'static str> {
    SNAPSHOTS
        .iter()
        .find(|(re, _)| re.is_match(model).unwrap_or(false))
        .map(|&(_, generic)| generic)
}
