use std::collections::HashMap;

use crate::error::{Error, Result};

/// One merge rule: `first` followed by `second` becomes `result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub first: String,
    pub second: String,
    pub result: String,
}

/// Ordered merge rules. A rule's rank is its position; lower merges first.
#[derive(Debug, Clone)]
pub struct MergeTable {
    rules: Vec<MergeRule>,
    // Keyed by `first` NUL `second`; NUL never occurs inside a symbol.
    ranks: HashMap<String, u32>,
}

impl MergeTable {
    pub fn new<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let rules: Vec<MergeRule> = pairs
            .into_iter()
            .map(|(a, b)| {
                let (first, second) = (a.into(), b.into());
                let result = format!("{first}{second}");
                MergeRule { first, second, result }
            })
            .collect();

        let mut ranks = HashMap::with_capacity(rules.len());
        let mut key = String::new();
        for (rank, rule) in rules.iter().enumerate() {
            pair_key(&mut key, &rule.first, &rule.second);
            // A repeated pair keeps its first (best) rank.
            ranks.entry(key.clone()).or_insert(rank as u32);
        }
        MergeTable { rules, ranks }
    }

    /// Parses the merge list resource: a header line, then one
    /// `first second` pair per line. Blank lines are ignored.
    pub fn from_resource(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).map_err(|e| Error::InvalidResource {
            what: "merge list",
            reason: e.to_string(),
        })?;

        let mut pairs = Vec::new();
        for (line_no, line) in text
            .split('\n')
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .skip(1)
        {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let (first, second) = line.split_once(' ').ok_or_else(|| Error::MalformedMerge {
                line: line_no + 1,
                text: line.to_string(),
            })?;
            pairs.push((first, second));
        }
        Ok(MergeTable::new(pairs))
    }

    /// Rank of merging `first` with `second`, if such a rule exists.
    #[inline]
    pub fn rank(&self, first: &str, second: &str, scratch: &mut String) -> Option<u32> {
        pair_key(scratch, first, second);
        self.ranks.get(scratch.as_str()).copied()
    }

    #[inline]
    pub(crate) fn rule(&self, rank: u32) -> &MergeRule {
        &self.rules[rank as usize]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn pair_key(buf: &mut String, first: &str, second: &str) {
    buf.clear();
    buf.push_str(first);
    buf.push('\0');
    buf.push_str(second);
}
