//! Dotted path expressions
//!
//! A path is a simplified JSONPath without the leading `$`: segments are
//! separated by `.` and a segment may address one element of an array-valued
//! field with `name[index]`.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Marker used as a whole path to splice a nested record into its parent
pub const DISMISS_NESTING: &str = "->";

/// Marker used as a whole path when every type clause carries its own path
pub const MULTI_TYPE: &str = "+";

static INDEX_SEGMENT: OnceLock<Regex> = OnceLock::new();

fn index_segment_regex() -> &'static Regex {
    INDEX_SEGMENT.get_or_init(|| {
        Regex::new(r"^([^\[\]]+)\[([^\[\]]*)\]$").expect("index segment pattern is valid")
    })
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Plain field name
    Key(String),
    /// Element `index` of the array-valued field `name`
    Index { name: String, index: usize },
}

impl Segment {
    /// Field name this segment looks up in the current map
    pub fn name(&self) -> &str {
        match self {
            Segment::Key(name) => name,
            Segment::Index { name, .. } => name,
        }
    }

    fn parse(raw: &str, path: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_path("empty segment", path));
        }
        if raw == DISMISS_NESTING || raw == MULTI_TYPE {
            return Err(Error::invalid_path(
                format!("marker '{}' is only valid as a whole path", raw),
                path,
            ));
        }
        if !raw.contains(['[', ']']) {
            return Ok(Segment::Key(raw.to_string()));
        }

        let captures = index_segment_regex()
            .captures(raw)
            .ok_or_else(|| Error::invalid_path(format!("malformed segment '{}'", raw), path))?;
        let index = captures[2].parse::<usize>().map_err(|_| {
            Error::invalid_path(format!("malformed array index '{}'", &captures[2]), path)
        })?;

        Ok(Segment::Index {
            name: captures[1].to_string(),
            index,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(name) => write!(f, "{}", name),
            Segment::Index { name, index } => write!(f, "{}[{}]", name, index),
        }
    }
}

/// Ordered sequence of segments addressing a node of a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a dotted path such as `config.list[0].field`
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_path("empty path", raw));
        }

        let segments = raw
            .split('.')
            .map(|segment| Segment::parse(segment, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// The empty path, addressing the tree root
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenate `self` as prefix with `other`
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Path { segments }
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
