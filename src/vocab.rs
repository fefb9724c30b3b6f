use std::collections::HashMap;

use crate::error::{Error, Result};

/// Delimiter between entries of the token list resource.
pub const TOKEN_SEPARATOR: u8 = 0;

/// Token strings by id, and the reverse lookup.
///
/// Ids are dense from zero. An empty entry is a gap in the source ordering:
/// it is never produced by encoding and decodes to nothing.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, u32>,
}

impl Vocabulary {
    pub fn new(tokens: Vec<String>) -> Self {
        let ids = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_empty())
            .map(|(id, token)| (token.clone(), id as u32))
            .collect();
        Vocabulary { tokens, ids }
    }

    /// Parses a NUL-delimited token list where position is the id. A single
    /// trailing delimiter terminates the last entry rather than starting a
    /// new one.
    pub fn from_resource(data: &[u8]) -> Result<Self> {
        let data = data.strip_suffix(&[TOKEN_SEPARATOR]).unwrap_or(data);
        if data.is_empty() {
            return Ok(Vocabulary::new(Vec::new()));
        }
        let tokens = data
            .split(|&b| b == TOKEN_SEPARATOR)
            .enumerate()
            .map(|(id, raw)| {
                std::str::from_utf8(raw)
                    .map(str::to_owned)
                    .map_err(|e| Error::InvalidResource {
                        what: "token list",
                        reason: format!("token {id}: {e}"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Vocabulary::new(tokens))
    }

    #[inline]
    pub fn id(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    #[inline]
    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
