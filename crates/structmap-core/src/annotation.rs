//! Field annotation parsing
//!
//! An annotation is the raw `#[sm("...")]` tag of a record field:
//!
//! ```text
//! <tag>        ::= <path> ("," <opt>)*
//! <path>       ::= "->" | "+" | <segment> ("." <segment>)*
//! <opt>        ::= "types<" <typeclause> ("|" <typeclause>)* ">"
//! <typeclause> ::= <typeName> [":" <path>]
//! ```
//!
//! Parsed annotations are cached process-wide by their tag text.

use crate::error::{Error, Result};
use crate::path::{Path, DISMISS_NESTING, MULTI_TYPE};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Separator between type clauses inside `types<...>`
pub const TYPES_SPLIT: char = '|';

/// Separator between a type name and its override path
pub const TYPES_PATH_SPLIT: char = ':';

static TYPE_OPTS: OnceLock<Regex> = OnceLock::new();

static ANNOTATION_CACHE: OnceLock<RwLock<HashMap<&'static str, Arc<Annotation>>>> =
    OnceLock::new();

fn type_opts_regex() -> &'static Regex {
    TYPE_OPTS.get_or_init(|| Regex::new(r"^types<([^>]+)>$").expect("types option pattern is valid"))
}

/// Primary target of an annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `->`: splice the nested record into the parent level
    DismissNesting,
    /// `+`: every matching type clause supplies its own path
    MultiType,
    /// A regular dotted path
    Path(Path),
}

/// One clause of a `types<...>` option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMatch {
    pub type_name: String,
    pub path: Option<Path>,
}

/// Parsed field annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    target: Target,
    type_matches: Vec<TypeMatch>,
}

impl Annotation {
    /// Parse a raw tag string
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split(',');
        let primary = parts.next().unwrap_or_default();

        let target = match primary {
            "" => return Err(Error::invalid_annotation("missing main path", raw)),
            DISMISS_NESTING => Target::DismissNesting,
            MULTI_TYPE => Target::MultiType,
            path => Target::Path(Path::parse(path)?),
        };

        let mut type_matches = Vec::new();
        for opt in parts {
            match type_opts_regex().captures(opt) {
                Some(captures) => type_matches.extend(parse_type_matches(&captures[1], raw)?),
                None => log::debug!("Ignoring unknown option '{}' in tag '{}'", opt, raw),
            }
        }

        Ok(Self {
            target,
            type_matches,
        })
    }

    /// Parse through the process-wide cache
    pub fn cached(raw: &'static str) -> Result<Arc<Self>> {
        let cache = ANNOTATION_CACHE.get_or_init(|| RwLock::new(HashMap::new()));

        if let Some(annotation) = cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(raw)
        {
            return Ok(Arc::clone(annotation));
        }

        let parsed = Arc::new(Self::parse(raw)?);
        let mut entries = cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(raw).or_insert(parsed)))
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn type_matches(&self) -> &[TypeMatch] {
        &self.type_matches
    }

    pub fn dismisses_nesting(&self) -> bool {
        self.target == Target::DismissNesting
    }

    /// Whether the field only takes part for the listed types
    pub fn is_type_gated(&self) -> bool {
        !self.type_matches.is_empty()
    }

    /// First clause naming `type_name`
    pub fn find_type_match(&self, type_name: &str) -> Option<&TypeMatch> {
        self.type_matches.iter().find(|m| m.type_name == type_name)
    }

    /// Whether any clause carries an override path
    pub fn has_override_paths(&self) -> bool {
        self.type_matches.iter().any(|m| m.path.is_some())
    }
}

fn parse_type_matches(data: &str, raw: &str) -> Result<Vec<TypeMatch>> {
    data.split(TYPES_SPLIT)
        .map(|clause| {
            let (type_name, path) = match clause.split_once(TYPES_PATH_SPLIT) {
                Some((name, path)) => (name, Some(Path::parse(path)?)),
                None => (clause, None),
            };
            if type_name.is_empty() {
                return Err(Error::invalid_annotation("empty type name in types<>", raw));
            }
            Ok(TypeMatch {
                type_name: type_name.to_string(),
                path,
            })
        })
        .collect()
}
