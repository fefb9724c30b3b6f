mod common;

use common::tiny_encoder;
use proptest::prelude::*;
use tokenbudget::bpe::{bpe, merge_round};
use tokenbudget::byte_level;
use tokenbudget::merges::MergeTable;
use tokenbudget::split::split;
use tokenbudget::{BudgetConfig, Msg, TokenBudget};

fn message() -> impl Strategy<Value = Msg> {
    ("[a-z ]{0,60}", 0..3u8).prop_map(|(content, role)| match role {
        0 => Msg::system(content),
        1 => Msg::user(content),
        _ => Msg::assistant(content),
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(s in "\\PC{0,80}") {
        let enc = tiny_encoder();
        let ids = enc.encode(&s);
        prop_assert_eq!(enc.decode(&ids).unwrap(), s);
    }

    #[test]
    fn whitespace_heavy_text_round_trips(s in "[ \t\n\ra-z'0-9.]{0,80}") {
        let enc = tiny_encoder();
        prop_assert_eq!(enc.decode(&enc.encode(&s)).unwrap(), s);
    }

    #[test]
    fn chunks_cover_text_exactly(s in "\\PC{0,80}|[ \t\n'a-z]{0,40}") {
        let chunks: Vec<&str> = split(&s).collect();
        prop_assert!(chunks.iter().all(|c| !c.is_empty()));
        prop_assert_eq!(chunks.concat(), s);
    }

    #[test]
    fn segmentation_is_deterministic(s in "\\PC{0,60}") {
        let a: Vec<&str> = split(&s).collect();
        let b: Vec<&str> = split(&s).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn every_merge_round_shrinks_and_preserves_bytes(s in "[ab]{1,30}") {
        let merges = MergeTable::new([("a", "b"), ("b", "a"), ("ab", "ab"), ("a", "a")]);
        let mut symbols = byte_level::alphabet().symbols(s.as_bytes());
        let n = symbols.len();
        let mut scratch = String::new();
        let mut rounds = 0;
        loop {
            let before = symbols.len();
            if !merge_round(&merges, &mut symbols, &mut scratch) {
                prop_assert_eq!(symbols.len(), before);
                break;
            }
            rounds += 1;
            prop_assert!(symbols.len() < before);
            prop_assert_eq!(symbols.concat(), s.clone());
        }
        prop_assert!(rounds < n);
        prop_assert!(!symbols.is_empty());
        prop_assert_eq!(bpe(&merges, byte_level::alphabet().symbols(s.as_bytes())), symbols);
    }

    #[test]
    fn count_matches_encode_len(s in "\\PC{0,80}") {
        let enc = tiny_encoder();
        prop_assert_eq!(enc.count_tokens(&s), enc.encode(&s).len());
    }

    #[test]
    fn fit_context_respects_budget_and_order(
        candidates in prop::collection::vec(message(), 0..12),
        limit in 0usize..200,
    ) {
        let enc = tiny_encoder();
        let budget = TokenBudget::new(&enc);
        let fit = budget.fit_context(&candidates, limit);

        prop_assert!(fit.tokens_used <= limit);
        let sum: usize = fit.selected.iter().map(|m| budget.message_token_count(m)).sum();
        prop_assert_eq!(sum, fit.tokens_used);

        // Selected messages appear in candidate order.
        let mut last = None;
        for sel in &fit.selected {
            let p = candidates.iter().position(|c| std::ptr::eq(c, *sel)).unwrap();
            prop_assert!(last.map_or(true, |l| p > l));
            last = Some(p);
        }
    }

    #[test]
    fn drop_history_only_drops_an_old_prefix(
        chat in prop::collection::vec(message(), 0..12),
        keep in 0usize..5,
        limit in 0usize..200,
    ) {
        let enc = tiny_encoder();
        let budget = TokenBudget::with_config(&enc, BudgetConfig::default());
        let total = budget.chat_token_count(&chat);
        let trimmed = budget.drop_history_if_needed(chat.clone(), keep, limit);

        prop_assert_eq!(trimmed.messages.len() + trimmed.dropped, chat.len());
        prop_assert_eq!(&trimmed.messages[..], &chat[trimmed.dropped..]);
        prop_assert!(trimmed.dropped <= chat.len().saturating_sub(keep));
        prop_assert_eq!(trimmed.tokens_used, budget.chat_token_count(&trimmed.messages));
        if total <= limit {
            prop_assert_eq!(&trimmed.messages, &chat);
        }
        if trimmed.tokens_used > limit {
            prop_assert_eq!(trimmed.messages.len(), keep.min(chat.len()));
        }
    }
}
