//! Character-class state machine over raw text.
//!
//! The tokenizer walks one chunk of bytes at a time and reports boundary
//! transitions to a callback; the state survives between chunks, so input
//! may be fed in arbitrary slices. Comment interiors produce no callbacks.

use crate::errors::ParseError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Lexer states. The six reportable states ([`LexState::needs_cb`]) mark
/// token, string, and list boundaries; the rest are interior.
pub enum LexState {
    /// Between tokens.
    Space,
    /// An open-paren just entered a list.
    ListEnter,
    /// A close-paren just exited a list.
    ListExit,
    /// First byte of a bare token.
    TokStart,
    /// Interior of a bare token.
    TokMid,
    /// The byte at this offset terminated a bare token.
    TokEnd,
    /// A semicolon just opened a comment.
    ComStart,
    /// Interior of a comment.
    ComMid,
    /// A CR/LF just closed a comment.
    ComEnd,
    /// An opening double-quote; the string body starts at the next byte.
    StrStart,
    /// Interior of a quoted string.
    StrMid,
    /// The closing double-quote of a string.
    StrEnd,
    /// A backslash inside a quoted string; the next byte is literal.
    StrEsc,
}

use LexState::*;

impl LexState {
    fn is_list(self) -> bool { self == ListEnter || self == ListExit }

    fn is_out(self) -> bool { self == TokEnd || self == StrEnd || self == ComEnd }

    /// Inside a bare token.
    pub fn in_token(self) -> bool { self == TokStart || self == TokMid }

    fn in_qstr(self) -> bool { self == StrStart || self == StrMid }

    fn in_comment(self) -> bool { self == ComStart || self == ComMid }

    /// Whether the tokenizer reports this state to the callback.
    pub fn needs_cb(self) -> bool {
        match self {
            ListEnter | ListExit | TokStart | TokEnd | StrStart | StrEnd => true,
            _ => false,
        }
    }

    /// Whether a chunk ending in this state has an unfinished token or
    /// string whose bytes the caller must carry into the next chunk.
    pub fn mid_token(self) -> bool {
        self.in_token() || self.in_qstr() || self == StrEsc
    }
}

#[derive(Debug)]
/// The tokenizer. Feed it chunks; it calls back on boundary transitions
/// with the chunk, the byte offset, and the state just entered.
pub struct Tokenizer {
    state: LexState,
}

impl Default for Tokenizer {
    fn default() -> Tokenizer { Tokenizer::new() }
}

impl Tokenizer {
    pub fn new() -> Tokenizer { Tokenizer { state: Space } }

    /// The state at the end of the last chunk.
    pub fn state(&self) -> LexState { self.state }

    /// Tokenizes one chunk. The callback may abort by returning an error,
    /// which is propagated as-is.
    pub fn feed<F>(&mut self, buf: &[u8], cb: &mut F) -> Result<(), ParseError>
    where
        F: FnMut(&[u8], usize, LexState) -> Result<(), ParseError>,
    {
        for (i, &ch) in buf.iter().enumerate() {
            match ch {
                b'(' | b')' => {
                    let target = if ch == b'(' { ListEnter } else { ListExit };
                    if self.state.is_list() || self.state.is_out() || self.state == Space {
                        self.state = target;
                    } else if self.state.in_token() {
                        // close the token first, then take the list boundary
                        self.state = TokEnd;
                        cb(buf, i, TokEnd)?;
                        self.state = target;
                    } else if self.state == StrStart || self.state == StrEsc {
                        self.state = StrMid;
                    } else if self.state == ComStart {
                        self.state = ComMid;
                    }
                }
                b' ' | b'\t' => {
                    if self.state.is_list() || self.state.is_out() {
                        self.state = Space;
                    } else if self.state.in_token() {
                        self.state = TokEnd;
                    } else if self.state == StrStart || self.state == StrEsc {
                        self.state = StrMid;
                    } else if self.state == ComStart {
                        self.state = ComMid;
                    }
                }
                b'\r' | b'\n' => {
                    if self.state.is_list() || self.state.is_out() {
                        self.state = Space;
                    } else if self.state.in_token() {
                        self.state = TokEnd;
                    } else if self.state == StrStart || self.state == StrEsc {
                        self.state = StrMid;
                    } else if self.state.in_comment() {
                        self.state = ComEnd;
                    }
                }
                b'"' => {
                    if self.state.is_list() || self.state.is_out() || self.state == Space {
                        self.state = StrStart;
                    } else if self.state.in_qstr() {
                        self.state = StrEnd;
                    } else if self.state == StrEsc {
                        self.state = StrMid;
                    } else if self.state == ComStart {
                        self.state = ComMid;
                    }
                    // a quote mid-token is an ordinary token byte
                }
                b'\\' => {
                    // only meaningful inside a quoted string
                    if self.state.in_qstr() {
                        self.state = StrEsc;
                    } else if self.state == StrEsc {
                        self.state = StrMid;
                    }
                }
                b';' => {
                    if self.state.is_list() || self.state.is_out() || self.state == Space {
                        self.state = ComStart;
                    } else if self.state.in_token() {
                        self.state = TokEnd;
                        cb(buf, i, TokEnd)?;
                        self.state = ComStart;
                    } else if self.state == StrStart || self.state == StrEsc {
                        self.state = StrMid;
                    } else if self.state == ComStart {
                        self.state = ComMid;
                    }
                }
                _ => {
                    if self.state.is_list() || self.state == Space || self.state.is_out() {
                        self.state = TokStart;
                    } else if self.state == TokStart {
                        self.state = TokMid;
                    } else if self.state == StrStart || self.state == StrEsc {
                        self.state = StrMid;
                    } else if self.state == ComStart {
                        self.state = ComMid;
                    }
                }
            }

            if self.state.needs_cb() {
                cb(buf, i, self.state)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &[u8]) -> Vec<(usize, LexState)> {
        let mut lexer = Tokenizer::new();
        let mut out = Vec::new();
        lexer
            .feed(input, &mut |_, idx, state| {
                out.push((idx, state));
                Ok(())
            })
            .unwrap();
        out
    }

    #[test]
    fn token_and_list_boundaries() {
        assert_eq!(
            events(b"(add 1)"),
            vec![
                (0, ListEnter),
                (1, TokStart),
                (4, TokEnd),
                (5, TokStart),
                (6, TokEnd),
                (6, ListExit),
            ]
        );
    }

    #[test]
    fn quote_mid_token_is_ordinary() {
        assert_eq!(events(b"a\"b "), vec![(0, TokStart), (3, TokEnd)]);
    }

    #[test]
    fn comments_are_silent() {
        assert_eq!(
            events(b"; (ignored) \"x\"\ny "),
            vec![(16, TokStart), (17, TokEnd)]
        );
    }

    #[test]
    fn escaped_quote_stays_in_string() {
        assert_eq!(events(b"\"a\\\"b\""), vec![(0, StrStart), (5, StrEnd)]);
    }

    #[test]
    fn semicolon_closes_token_first() {
        assert_eq!(
            events(b"ab;c\nd "),
            vec![(0, TokStart), (2, TokEnd), (5, TokStart), (6, TokEnd)]
        );
    }

    #[test]
    fn backslash_outside_string_is_inert() {
        assert_eq!(events(b"\\ x "), vec![(2, TokStart), (3, TokEnd)]);
    }

    #[test]
    fn state_survives_chunks() {
        let mut lexer = Tokenizer::new();
        let mut out = Vec::new();
        let mut cb = |_: &[u8], idx: usize, state: LexState| {
            out.push((idx, state));
            Ok(())
        };
        lexer.feed(b"ab", &mut cb).unwrap();
        assert!(lexer.state().mid_token());
        lexer.feed(b"c ", &mut cb).unwrap();
        assert_eq!(out, vec![(0, TokStart), (1, TokEnd)]);
    }

    #[test]
    fn callback_abort_propagates() {
        let mut lexer = Tokenizer::new();
        let res = lexer.feed(b"x ", &mut |_, _, _| {
            Err(ParseError::Aborted("enough".to_string()))
        });
        assert!(res.is_err());
    }
}
