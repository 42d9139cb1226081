//! Structural addresses for nodes inside a value tree.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How key segments are written into a rendered pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerStyle {
    /// Segments are appended verbatim; a key containing `/` is ambiguous.
    #[default]
    Plain,
    /// RFC 6901 escaping: `~` becomes `~0`, `/` becomes `~1`.
    Rfc6901,
}

/// Position of a node in the tree, rendered as a `/`-separated path.
///
/// The root renders as `/`. Children of the root render as `/key`, deeper
/// nodes as `/key/0/...`. A pointer is derived from position only and is
/// rebuilt on every traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    rendered: String,
    depth: usize,
    style: PointerStyle,
}

impl Pointer {
    pub fn root() -> Self {
        Self::root_with(PointerStyle::default())
    }

    pub fn root_with(style: PointerStyle) -> Self {
        Self {
            rendered: "/".to_string(),
            depth: 0,
            style,
        }
    }

    /// Pointer to the property `key` of the object at `self`.
    pub fn child(&self, key: &str) -> Self {
        let segment = match self.style {
            PointerStyle::Plain => Cow::Borrowed(key),
            PointerStyle::Rfc6901 => escape_segment(key),
        };
        self.push(&segment)
    }

    /// Pointer to element `index` of the array at `self`.
    pub fn index(&self, index: usize) -> Self {
        self.push(&index.to_string())
    }

    fn push(&self, segment: &str) -> Self {
        let mut rendered = String::with_capacity(self.rendered.len() + segment.len() + 1);
        if !self.is_root() {
            rendered.push_str(&self.rendered);
        }
        rendered.push('/');
        rendered.push_str(segment);
        Self {
            rendered,
            depth: self.depth + 1,
            style: self.style,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Number of segments below the root (root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The rendered last segment, or `None` for the root.
    pub fn last_segment(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.rendered.rsplit('/').next()
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.rendered.ends_with(suffix)
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for Pointer {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq<str> for Pointer {
    fn eq(&self, other: &str) -> bool {
        self.rendered == other
    }
}

impl PartialEq<&str> for Pointer {
    fn eq(&self, other: &&str) -> bool {
        self.rendered == *other
    }
}

fn escape_segment(key: &str) -> Cow<'_, str> {
    if !key.contains(['~', '/']) {
        return Cow::Borrowed(key);
    }
    Cow::Owned(key.replace('~', "~0").replace('/', "~1"))
}
