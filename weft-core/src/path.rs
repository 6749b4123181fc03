//! Dot-joined paths addressing nodes inside a token tree.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A path to a node inside a token tree, stored as its segments.
///
/// The root path is empty and displays as `""`. A child's path is always its
/// parent's path plus one segment, so upward navigation is plain truncation —
/// nodes never hold owning back-pointers to their parents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPath {
    segments: Vec<String>,
}

impl TokenPath {
    /// Separator used in the rendered form.
    pub const SEPARATOR: char = '.';

    /// The empty root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a dot-joined path. The empty string parses to the root path.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::root();
        }
        Self {
            segments: raw.split(Self::SEPARATOR).map(str::to_owned).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The last segment, i.e. the node's own name. `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path extended by one segment.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Self { segments }
    }

    /// The path with the last segment truncated. `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether `prefix` is an ancestor-or-self of this path.
    pub fn starts_with(&self, prefix: &TokenPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for TokenPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for TokenPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathVisitor;

        impl de::Visitor<'_> for PathVisitor {
            type Value = TokenPath;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a dot-joined token path")
            }

            fn visit_str<E: de::Error>(self, raw: &str) -> Result<Self::Value, E> {
                Ok(TokenPath::parse(raw))
            }
        }

        deserializer.deserialize_str(PathVisitor)
    }
}
