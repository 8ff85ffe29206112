use std::fmt;

use crate::error::PathError;

/// One logical step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A parsed field path such as `domains.articulation.strengths` or
/// `goals[2].objectives.0`.
///
/// Segments are split on `.`. A pure-integer segment is an array index and
/// `name[n]` expands into a key followed by an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for raw in path.split('.') {
            if raw.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                });
            }
            if let Some(index) = parse_index(raw) {
                segments.push(PathSegment::Index(index));
            } else if let Some((key, index)) = split_bracket(raw) {
                segments.push(PathSegment::Key(key.to_string()));
                segments.push(PathSegment::Index(index));
            } else {
                segments.push(PathSegment::Key(raw.to_string()));
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Dotted rendering of the first `len` segments; `$` for the root.
    pub fn prefix(&self, len: usize) -> String {
        if len == 0 {
            return "$".to_string();
        }
        join(&self.segments[..len.min(self.segments.len())])
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&join(&self.segments))
    }
}

fn join(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn parse_index(s: &str) -> Option<usize> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn split_bracket(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_suffix(']')?;
    let (key, index) = inner.split_once('[')?;
    if key.is_empty() {
        return None;
    }
    Some((key, parse_index(index)?))
}
