//! Builds a value tree from tokenizer events.
//!
//! The textual syntax is its own schema: lists become `Seq`-tagged
//! containers, bare atoms become strings or numbers, and quoted strings are
//! unescaped in place. A [`Parser`] may be fed input in arbitrary chunks;
//! tokens and strings that straddle a chunk boundary are carried over
//! intact.
//!
//! # Example
//!
//! ```
//! use tson::prelude::*;
//!
//! let (tree, root) = read_from(&b"(add 1 2.5)"[..]).unwrap();
//!
//! let form = tree.child(root, 0).unwrap();
//! assert_eq!(tree.children(form).len(), 3);
//! ```

use crate::{
    errors::ParseError,
    schema::Schema,
    tag::Tag,
    text::lex::{LexState, Tokenizer},
    tree::{NodeId, Tree, Value},
};
use smallvec::SmallVec;
use std::{io::Read, sync::Arc};

/// Input is pulled from a reader in blocks of this size.
const BLOCKSZ: usize = 4096 * 8;

/// Removes each backslash and keeps the byte that follows it.
fn unescape(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] == b'\\' {
            i += 1;
            if i < src.len() {
                out.push(src[i]);
            }
        } else {
            out.push(src[i]);
        }
        i += 1;
    }
    out
}

/// The narrowest string kind whose length field fits `len`.
fn str_tag_for(len: usize) -> Tag {
    if len <= i8::max_value() as usize {
        Tag::Str8
    } else if len <= i16::max_value() as usize {
        Tag::Str16
    } else if len <= i32::max_value() as usize {
        Tag::Str32
    } else {
        Tag::Str64
    }
}

fn make_string(tree: &mut Tree, bytes: &[u8]) -> NodeId {
    tree.make_str(str_tag_for(bytes.len()), bytes)
        .expect("length fits the chosen tag")
}

/// Bare atoms starting with `+`, `-`, or a digit are numbers: a `.`
/// anywhere in the token selects Double, otherwise Int64 radix 10.
/// Degenerate numeric tokens parse as zero.
fn make_atom(tree: &mut Tree, tok: &[u8]) -> NodeId {
    match tok.first() {
        Some(&c) if c == b'+' || c == b'-' || c.is_ascii_digit() => {
            if tok.contains(&b'.') {
                let v = std::str::from_utf8(tok)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.0);
                tree.make_double(v)
            } else {
                let v = std::str::from_utf8(tok)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                tree.make_i64(v)
            }
        }
        _ => make_string(tree, tok),
    }
}

#[derive(Debug)]
/// Incremental text parser: a [`Tokenizer`] plus the tree under
/// construction.
///
/// The root is a synthetic list holding the top-level forms; nested lists
/// move a cursor down and up as they open and close.
pub struct Parser {
    lexer: Tokenizer,
    tree: Tree,
    root: NodeId,
    cursor: NodeId,
    depth: usize,
    offset: usize,
    tokstart: usize,
    carry: SmallVec<[u8; 64]>,
    list_schema: Arc<Schema>,
}

impl Default for Parser {
    fn default() -> Parser { Parser::new() }
}

impl Parser {
    pub fn new() -> Parser {
        let list_schema = Schema::make(Tag::Seq);
        let mut tree = Tree::new();
        let root = tree.push(list_schema.clone(), Value::fields(), Tag::Seq.expect_size());
        Parser {
            lexer: Tokenizer::new(),
            tree,
            root,
            cursor: root,
            depth: 0,
            offset: 0,
            tokstart: 0,
            carry: SmallVec::new(),
            list_schema,
        }
    }

    /// Current list nesting depth; zero when all opened lists are closed.
    pub fn depth(&self) -> usize { self.depth }

    /// Consumes one chunk of input. Partial tokens at the end of the chunk
    /// are carried into the next call.
    ///
    /// # Errors
    ///
    /// Fails on an unbalanced close-paren; the parse cannot be resumed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        let Parser {
            lexer,
            tree,
            cursor,
            depth,
            offset,
            tokstart,
            carry,
            list_schema,
            ..
        } = self;

        *tokstart = 0;
        lexer.feed(chunk, &mut |buf, idx, state| {
            match state {
                LexState::TokStart => *tokstart = idx,
                // the string body starts after the opening quote
                LexState::StrStart => *tokstart = idx + 1,
                LexState::TokEnd => {
                    carry.extend_from_slice(&buf[*tokstart..idx]);
                    let node = make_atom(tree, carry);
                    carry.clear();
                    tree.add_child(*cursor, node)
                        .expect("cursor points at a list");
                }
                LexState::StrEnd => {
                    carry.extend_from_slice(&buf[*tokstart..idx]);
                    let unescaped = unescape(carry);
                    let node = make_string(tree, &unescaped);
                    carry.clear();
                    tree.add_child(*cursor, node)
                        .expect("cursor points at a list");
                }
                LexState::ListEnter => {
                    let node = tree
                        .make_container(list_schema)
                        .expect("seq is a container");
                    tree.add_child(*cursor, node)
                        .expect("cursor points at a list");
                    *cursor = node;
                    *depth += 1;
                }
                LexState::ListExit => {
                    if *depth == 0 {
                        return Err(ParseError::UnbalancedClose {
                            offset: *offset + idx,
                        });
                    }
                    *depth -= 1;
                    match tree.parent(*cursor) {
                        Some(parent) => *cursor = parent,
                        // exiting the synthetic root would corrupt the walk
                        None => {
                            return Err(ParseError::UnbalancedClose {
                                offset: *offset + idx,
                            })
                        }
                    }
                }
                _ => {}
            }
            Ok(())
        })?;

        if self.lexer.state().mid_token() {
            self.carry.extend_from_slice(&chunk[self.tokstart..]);
        }
        self.offset += chunk.len();
        Ok(())
    }

    /// Ends the parse, returning the tree and the synthetic root list.
    ///
    /// An unterminated token, string, comment, or list at end of input
    /// simply never produced its closing event; the tree is returned
    /// as-is and [`Parser::depth`] reports any lists left open.
    pub fn finish(self) -> (Tree, NodeId) { (self.tree, self.root) }
}

/// Reads a byte source to exhaustion in fixed-size blocks and parses it.
///
/// # Errors
///
/// Propagates I/O failures and structural parse errors; the partial tree is
/// dropped.
pub fn read_from<R: Read>(mut r: R) -> Result<(Tree, NodeId), ParseError> {
    let mut parser = Parser::new();
    let mut buf = vec![0u8; BLOCKSZ];
    loop {
        let nread = r.read(&mut buf)?;
        if nread == 0 {
            break;
        }
        parser.feed(&buf[..nread])?;
    }
    Ok(parser.finish())
}
