//! Pre-tokenization: splits text into the chunks that BPE merges run over.
//!
//! Hand-rolled equivalent of the GPT-2 pattern
//!
//! ```text
//! 's|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+
//! ```
//!
//! except that a whitespace run only gives up its final character to the
//! next chunk when that character is a plain space.
//!
//! `\p{L}` and `\p{N}` are the Unicode general categories L* and N*; marks,
//! symbols and punctuation all fall into the "other" run.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Scanner state. The current chunk always starts at `Chunks::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    AfterApostrophe,
    /// Saw `'r` or `'v`.
    ApostropheNeedE,
    /// Saw `'l`.
    ApostropheNeedL,
    /// Chunk is a single space so far; it will join whatever follows.
    AfterSpace,
    /// Whitespace run whose last character is a space.
    WhitespaceAfterSpace,
    /// Whitespace run whose last character is other whitespace.
    WhitespaceAfterOther,
    Letters,
    Numbers,
    Other,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    Whitespace,
    Letter,
    Number,
    Other,
}

impl Class {
    fn of(ch: char) -> Class {
        if ch == ' ' {
            Class::Space
        } else if ch.is_whitespace() {
            Class::Whitespace
        } else if ch.is_ascii() {
            match ch {
                'a'..='z' | 'A'..='Z' => Class::Letter,
                '0'..='9' => Class::Number,
                _ => Class::Other,
            }
        } else {
            match get_general_category(ch) {
                GeneralCategory::UppercaseLetter
                | GeneralCategory::LowercaseLetter
                | GeneralCategory::TitlecaseLetter
                | GeneralCategory::ModifierLetter
                | GeneralCategory::OtherLetter => Class::Letter,
                GeneralCategory::DecimalNumber
                | GeneralCategory::LetterNumber
                | GeneralCategory::OtherNumber => Class::Number,
                _ => Class::Other,
            }
        }
    }
}

enum Action {
    /// Consume the character and continue in the given state.
    Consume(State),
    /// Re-examine the character in the given state without consuming it.
    Reexamine(State),
    /// Consume the character and end the chunk after it.
    EmitThrough,
    /// End the chunk before the character, then re-examine it.
    EmitBefore,
    /// End the chunk before the trailing space of a whitespace run; the space
    /// starts the next chunk.
    EmitBeforeTrailingSpace,
    /// A contraction did not complete: the apostrophe is a chunk of its own
    /// and scanning resumes right after it.
    EmitApostrophe,
}

fn transition(state: State, ch: char) -> Action {
    let class = Class::of(ch);
    match state {
        State::Initial => Action::Consume(match (ch, class) {
            ('\'', _) => State::AfterApostrophe,
            (_, Class::Space) => State::AfterSpace,
            (_, Class::Whitespace) => State::WhitespaceAfterOther,
            (_, Class::Letter) => State::Letters,
            (_, Class::Number) => State::Numbers,
            (_, Class::Other) => State::Other,
        }),
        State::AfterApostrophe => match ch {
            's' | 't' | 'm' | 'd' => Action::EmitThrough,
            'r' | 'v' => Action::Consume(State::ApostropheNeedE),
            'l' => Action::Consume(State::ApostropheNeedL),
            _ => Action::Reexamine(State::Other),
        },
        State::ApostropheNeedE => match ch {
            'e' => Action::EmitThrough,
            _ => Action::EmitApostrophe,
        },
        State::ApostropheNeedL => match ch {
            'l' => Action::EmitThrough,
            _ => Action::EmitApostrophe,
        },
        State::AfterSpace => Action::Consume(match class {
            Class::Space => State::WhitespaceAfterSpace,
            Class::Whitespace => State::WhitespaceAfterOther,
            Class::Letter => State::Letters,
            Class::Number => State::Numbers,
            Class::Other => State::Other,
        }),
        State::WhitespaceAfterOther => match class {
            Class::Space => Action::Consume(State::WhitespaceAfterSpace),
            Class::Whitespace => Action::Consume(State::WhitespaceAfterOther),
            _ => Action::EmitBefore,
        },
        State::WhitespaceAfterSpace => match class {
            Class::Space => Action::Consume(State::WhitespaceAfterSpace),
            Class::Whitespace => Action::Consume(State::WhitespaceAfterOther),
            _ => Action::EmitBeforeTrailingSpace,
        },
        State::Letters => match class {
            Class::Letter => Action::Consume(State::Letters),
            _ => Action::EmitBefore,
        },
        State::Numbers => match class {
            Class::Number => Action::Consume(State::Numbers),
            _ => Action::EmitBefore,
        },
        State::Other => match class {
            Class::Space | Class::Whitespace | Class::Letter | Class::Number => Action::EmitBefore,
            Class::Other => Action::Consume(State::Other),
        },
        State::Done => Action::EmitBefore,
    }
}

/// Splits `text` into chunks. Concatenating the chunks yields `text`.
pub fn split(text: &str) -> Chunks<'_> {
    Chunks {
        text,
        start: 0,
        pos: 0,
        state: State::Initial,
    }
}

/// Iterator over the chunks of a string, see [`split`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    start: usize,
    pos: usize,
    state: State,
}

impl<'a> Chunks<'a> {
    fn emit(&mut self, end: usize, next: State) -> &'a str {
        let chunk = &self.text[self.start..end];
        self.start = end;
        self.state = next;
        chunk
    }

    /// The lone apostrophe that began the current chunk.
    fn emit_apostrophe(&mut self) -> &'a str {
        let end = self.start + 1;
        self.pos = end;
        self.emit(end, State::Initial)
    }

    fn finish(&mut self) -> Option<&'a str> {
        match self.state {
            State::Done => None,
            State::ApostropheNeedE | State::ApostropheNeedL => Some(self.emit_apostrophe()),
            _ if self.start == self.text.len() => {
                self.state = State::Done;
                None
            }
            _ => Some(self.emit(self.text.len(), State::Done)),
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if self.state == State::Done {
                return None;
            }
            let Some(ch) = self.text[self.pos..].chars().next() else {
                return self.finish();
            };
            let len = ch.len_utf8();
            match transition(self.state, ch) {
                Action::Consume(next) => {
                    self.pos += len;
                    self.state = next;
                }
                Action::Reexamine(next) => self.state = next,
                Action::EmitThrough => {
                    self.pos += len;
                    return Some(self.emit(self.pos, State::Initial));
                }
                Action::EmitBefore => return Some(self.emit(self.pos, State::Initial)),
                Action::EmitBeforeTrailingSpace => {
                    return Some(self.emit(self.pos - 1, State::AfterSpace));
                }
                Action::EmitApostrophe => return Some(self.emit_apostrophe()),
            }
        }
    }
}
