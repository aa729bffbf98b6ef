//! # JSON Pointer Paths
//!
//! RFC 6901 JSON Pointers as an owned token sequence. The validation engine
//! threads two of these through every evaluation: the instance path (where
//! in the document a violation occurred) and the schema path (which keyword
//! produced it). Anchor tables in the schema registry also store their
//! locations as pointers.
//!
//! ## Escaping
//!
//! `~` and `/` inside a key render as `~0` and `~1`. Tokens are stored
//! unescaped; escaping happens only at the `Display`/parse boundary.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::PointerError;

/// One step of a JSON Pointer: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// An object member name (unescaped).
    Key(String),
    /// An array element index.
    Index(usize),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Key(k) => {
                for ch in k.chars() {
                    match ch {
                        '~' => f.write_str("~0")?,
                        '/' => f.write_str("~1")?,
                        c => write!(f, "{c}")?,
                    }
                }
                Ok(())
            }
            PathToken::Index(i) => write!(f, "{i}"),
        }
    }
}

/// An ordered sequence of path tokens addressing a location in a document.
///
/// The empty pointer addresses the document root and renders as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer(Vec<PathToken>);

impl JsonPointer {
    /// The root pointer.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse an RFC 6901 pointer string (e.g. `/a/b/0`, `""` for root).
    ///
    /// Numeric tokens are stored as [`PathToken::Key`]; [`Self::lookup`]
    /// reinterprets them as indices when it meets an array.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError`] if the string is non-empty but does not
    /// start with `/`, or contains a `~` escape other than `~0`/`~1`.
    pub fn parse(text: &str) -> Result<Self, PointerError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(PointerError::MissingLeadingSlash(text.to_string()));
        };
        let mut tokens = Vec::new();
        for raw in rest.split('/') {
            tokens.push(PathToken::Key(unescape(text, raw)?));
        }
        Ok(Self(tokens))
    }

    /// Append an object key.
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.0.push(PathToken::Key(key.into()));
    }

    /// Append an array index.
    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathToken::Index(index));
    }

    /// Remove the last token, if any.
    pub fn pop(&mut self) -> Option<PathToken> {
        self.0.pop()
    }

    /// The tokens in order.
    pub fn tokens(&self) -> &[PathToken] {
        &self.0
    }

    /// True for the root pointer.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk `doc` along this pointer, returning the addressed node.
    ///
    /// Keys that look numeric address array elements when the current node
    /// is an array; otherwise they address object members. Returns `None`
    /// if any step is absent.
    pub fn lookup<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut node = doc;
        for token in &self.0 {
            node = match (token, node) {
                (PathToken::Key(k), Value::Object(map)) => map.get(k)?,
                (PathToken::Key(k), Value::Array(items)) => {
                    let idx: usize = k.parse().ok()?;
                    items.get(idx)?
                }
                (PathToken::Index(i), Value::Array(items)) => items.get(*i)?,
                (PathToken::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
                _ => return None,
            };
        }
        Some(node)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "/{token}")?;
        }
        Ok(())
    }
}

/// Serializes as the RFC 6901 string form.
impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn unescape(pointer: &str, token: &str) -> Result<String, PointerError> {
    if !token.contains('~') {
        return Ok(token.to_string());
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PointerError::BadEscape {
                    pointer: pointer.to_string(),
                    token: token.to_string(),
                })
            }
        }
    }
    Ok(out)
}
