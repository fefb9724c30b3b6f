#![allow(dead_code)]

pub use tokenbudget::testing::tiny_encoder;
use tokenbudget::Msg;

/// A user message whose content is exactly `n` tokens under [`tiny_encoder`].
pub fn msg_of(n: usize) -> Msg {
    Msg::user("x".repeat(n))
}
