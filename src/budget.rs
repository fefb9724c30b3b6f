//! Token accounting for chat prompts: counting messages, filling a budget
//! with optional context, and trimming history to fit a context window.

use rayon::prelude::*;

use crate::bpe::BpeEncoder;
use crate::chat::Msg;

/// Overheads and thresholds used by [`TokenBudget`].
///
/// The chat format adds tokens the tokenizer never sees (role markers,
/// separators). Their exact cost is unpublished, so these are estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Added to the content tokens of every message.
    pub per_message_overhead: usize,
    /// Added once per chat.
    pub chat_overhead: usize,
    /// `fit_context` stops once less than this much budget remains.
    pub min_fill: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        BudgetConfig {
            per_message_overhead: 5,
            chat_overhead: 2,
            min_fill: 20,
        }
    }
}

/// Messages chosen by [`TokenBudget::fit_context`], in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fit<'m> {
    pub selected: Vec<&'m Msg>,
    pub tokens_used: usize,
}

/// Result of [`TokenBudget::drop_history_if_needed`].
///
/// `tokens_used` can still exceed the budget when every droppable message is
/// gone; that is reported, not treated as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trimmed {
    pub messages: Vec<Msg>,
    pub tokens_used: usize,
    pub dropped: usize,
}

pub struct TokenBudget<'a> {
    encoder: &'a BpeEncoder,
    config: BudgetConfig,
}

impl<'a> TokenBudget<'a> {
    pub fn new(encoder: &'a BpeEncoder) -> Self {
        Self::with_config(encoder, BudgetConfig::default())
    }

    pub fn with_config(encoder: &'a BpeEncoder, config: BudgetConfig) -> Self {
        TokenBudget { encoder, config }
    }

    pub fn token_count(&self, text: &str) -> usize {
        self.encoder.count_tokens(text)
    }

    pub fn message_token_count(&self, msg: &Msg) -> usize {
        self.token_count(&msg.content) + self.config.per_message_overhead
    }

    pub fn chat_token_count(&self, messages: &[Msg]) -> usize {
        self.config.chat_overhead
            + messages
                .iter()
                .map(|m| self.message_token_count(m))
                .sum::<usize>()
    }

    /// Greedily picks candidates that fit into `budget`, skipping the ones
    /// that don't, and gives up once the remainder is too small to bother.
    pub fn fit_context<'m>(&self, candidates: &'m [Msg], budget: usize) -> Fit<'m> {
        let mut remaining = budget;
        let mut selected = Vec::new();
        for msg in candidates {
            let n = self.message_token_count(msg);
            if n <= remaining {
                selected.push(msg);
                remaining -= n;
            }
            if remaining < self.config.min_fill {
                break;
            }
        }
        Fit {
            selected,
            tokens_used: budget - remaining,
        }
    }

    /// Drops the oldest messages until the chat fits into `budget`. The last
    /// `fixed_suffix_len` messages are never dropped.
    pub fn drop_history_if_needed(
        &self,
        mut chat: Vec<Msg>,
        fixed_suffix_len: usize,
        budget: usize,
    ) -> Trimmed {
        // Counting is the expensive part; do it once per message.
        let costs: Vec<usize> = if chat.len() > 1 {
            chat.par_iter().map(|m| self.message_token_count(m)).collect()
        } else {
            chat.iter().map(|m| self.message_token_count(m)).collect()
        };
        let mut tokens_used = self.config.chat_overhead + costs.iter().sum::<usize>();

        let droppable = chat.len().saturating_sub(fixed_suffix_len);
        let mut dropped = 0;
        while tokens_used > budget && dropped < droppable {
            tokens_used -= costs[dropped];
            dropped += 1;
        }

        if dropped > 0 {
            chat.drain(..dropped);
        }
        Trimmed {
            messages: chat,
            tokens_used,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tiny_encoder;

    /// A message whose content is exactly `n` tokens under the tiny encoder.
    fn msg_of(n: usize) -> Msg {
        Msg::user("x".repeat(n))
    }

    #[test]
    fn counts_include_overheads() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        assert_eq!(budget.token_count(""), 0);
        assert_eq!(budget.token_count("Hello world"), 2);
        assert_eq!(budget.message_token_count(&Msg::user("Hello world")), 7);
        assert_eq!(
            budget.chat_token_count(&[Msg::system("Hello"), Msg::user("Hello world")]),
            2 + 6 + 7
        );
        assert_eq!(budget.chat_token_count(&[]), 2);
    }

    #[test]
    fn overhead_is_configurable() {
        let enc = tiny_encoder();
        let config = BudgetConfig {
            per_message_overhead: 0,
            chat_overhead: 0,
            ..BudgetConfig::default()
        };
        let budget = TokenBudget::with_config(&enc, config);
        assert_eq!(budget.message_token_count(&msg_of(4)), 4);
        assert_eq!(budget.chat_token_count(&[msg_of(4), msg_of(3)]), 7);
    }

    #[test]
    fn fit_context_skips_what_does_not_fit() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let candidates = [msg_of(95), msg_of(4995), msg_of(45)];
        let fit = budget.fit_context(&candidates, 200);
        assert_eq!(fit.selected, vec![&candidates[0], &candidates[2]]);
        assert_eq!(fit.tokens_used, 150);
    }

    #[test]
    fn fit_context_stops_when_the_hole_is_small() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        // 185 used leaves 15, below the fill threshold, so the 5-token
        // message after it is not considered even though it would fit.
        let candidates = [msg_of(180), msg_of(0)];
        let fit = budget.fit_context(&candidates, 200);
        assert_eq!(fit.selected, vec![&candidates[0]]);
        assert_eq!(fit.tokens_used, 185);
    }

    #[test]
    fn fit_context_below_threshold_still_tries_first_candidate() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let candidates = [msg_of(1), msg_of(1)];
        let fit = budget.fit_context(&candidates, 10);
        assert_eq!(fit.selected, vec![&candidates[0]]);
        assert_eq!(fit.tokens_used, 6);
    }

    #[test]
    fn drop_history_drops_oldest_first() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let (a, b, c, d) = (msg_of(10), msg_of(20), msg_of(25), msg_of(5));
        let chat = vec![a, b, c.clone(), d.clone()];
        let total = budget.chat_token_count(&chat);
        let c_cost = budget.message_token_count(&c);

        let trimmed = budget.drop_history_if_needed(chat, 1, total - c_cost);
        assert_eq!(trimmed.messages, vec![c, d]);
        assert_eq!(trimmed.dropped, 2);
        assert_eq!(trimmed.tokens_used, total - 15 - 25);
    }

    #[test]
    fn drop_history_leaves_fitting_chat_alone() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let chat = vec![msg_of(3), msg_of(4)];
        let total = budget.chat_token_count(&chat);
        let trimmed = budget.drop_history_if_needed(chat.clone(), 1, total);
        assert_eq!(trimmed.messages, chat);
        assert_eq!(trimmed.tokens_used, total);
        assert_eq!(trimmed.dropped, 0);
    }

    #[test]
    fn drop_history_reports_overflow_when_suffix_is_too_big() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let last = msg_of(50);
        let chat = vec![msg_of(10), last.clone()];
        let trimmed = budget.drop_history_if_needed(chat, 1, 20);
        assert_eq!(trimmed.messages, vec![last]);
        assert_eq!(trimmed.tokens_used, 2 + 55);
    }

    #[test]
    fn drop_history_with_suffix_longer_than_chat_drops_nothing() {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let chat = vec![msg_of(10), msg_of(10)];
        let trimmed = budget.drop_history_if_needed(chat.clone(), 5, 0);
        assert_eq!(trimmed.messages, chat);
        assert_eq!(trimmed.dropped, 0);
    }
}
