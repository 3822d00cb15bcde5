//! Breadcrumb paths for structural equivalency diagnostics.
//!
//! A [`Path`] names one position inside a compared object graph, rendered the
//! way assertion messages print it:
//!
//! - `Customers[2].Name` for members and sequence indices
//! - `Roles["admin"][1]` for dictionary keys
//!
//! Paths are immutable. Descending into a child always produces a new path
//! ([`Path::member`], [`Path::index`], [`Path::key`]); nothing is mutated after
//! construction.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("member path must not be empty")]
    Empty,
    #[error("empty member name at offset {0}")]
    EmptyMember(usize),
    #[error("unterminated bracket starting at offset {0}")]
    UnterminatedBracket(usize),
    #[error("unterminated quoted key starting at offset {0}")]
    UnterminatedKey(usize),
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },
}

/// One breadcrumb step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Named member of a complex object: `.Name`
    Member(String),
    /// Position inside a sequence: `[2]`
    Index(usize),
    /// Dictionary key, stored already rendered (`"admin"`, `42`): `["admin"]`
    Key(String),
    /// Any index, only produced by parsing `[]` in selection patterns.
    AnyIndex,
}

impl Segment {
    pub fn is_member(&self) -> bool {
        matches!(self, Segment::Member(_))
    }
}

/// Quotes a string dictionary key for use inside brackets.
///
/// Examples:
/// - `admin -> "admin"`
/// - `a"b -> "a\"b"`
pub fn quote_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    out.push('"');
    for ch in key.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Reverses [`quote_key`]. Returns the input unchanged when it is not quoted.
pub fn unquote_key(key: &str) -> String {
    let Some(inner) = key
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return key.to_string();
    };
    if !inner.contains('\\') {
        return inner.to_string();
    }
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Format segments into breadcrumb text without a root label.
pub fn format_path(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Member(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Segment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            Segment::Key(key) => {
                out.push('[');
                out.push_str(key);
                out.push(']');
            }
            Segment::AnyIndex => out.push_str("[]"),
        }
    }
    out
}

/// Parse breadcrumb text into segments.
///
/// Examples:
/// - `"Name" -> [Member(Name)]`
/// - `"Customers[2].Name" -> [Member(Customers), Index(2), Member(Name)]`
/// - `"Roles[\"admin\"][]" -> [Member(Roles), Key("admin"), AnyIndex]`
pub fn parse_path(text: &str) -> Result<Vec<Segment>, PathError> {
    if text.trim().is_empty() {
        return Err(PathError::Empty);
    }
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut expect_member = true;

    while pos < chars.len() {
        let (offset, ch) = chars[pos];
        match ch {
            '[' => {
                let (segment, next) = parse_bracket(text, &chars, pos)?;
                segments.push(segment);
                pos = next;
                expect_member = false;
            }
            '.' => {
                if expect_member {
                    return Err(PathError::EmptyMember(offset));
                }
                pos += 1;
                expect_member = true;
                if pos == chars.len() {
                    return Err(PathError::EmptyMember(text.len()));
                }
            }
            ']' => return Err(PathError::UnexpectedCharacter { found: ch, offset }),
            _ => {
                if !expect_member {
                    return Err(PathError::UnexpectedCharacter { found: ch, offset });
                }
                let start = pos;
                while pos < chars.len() && !matches!(chars[pos].1, '.' | '[' | ']') {
                    pos += 1;
                }
                let end = chars.get(pos).map_or(text.len(), |(o, _)| *o);
                let name = text[chars[start].0..end].trim();
                if name.is_empty() {
                    return Err(PathError::EmptyMember(offset));
                }
                segments.push(Segment::Member(name.to_string()));
                expect_member = false;
            }
        }
    }
    Ok(segments)
}

fn parse_bracket(
    text: &str,
    chars: &[(usize, char)],
    open: usize,
) -> Result<(Segment, usize), PathError> {
    let open_offset = chars[open].0;
    let mut pos = open + 1;

    if chars.get(pos).map(|(_, c)| *c) == Some('"') {
        let quote_offset = chars[pos].0;
        pos += 1;
        let mut escaped = false;
        loop {
            let Some(&(_, ch)) = chars.get(pos) else {
                return Err(PathError::UnterminatedKey(quote_offset));
            };
            pos += 1;
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                break;
            }
        }
        let close = chars.get(pos).map(|(_, c)| *c);
        if close != Some(']') {
            return Err(PathError::UnterminatedBracket(open_offset));
        }
        let key = &text[quote_offset..chars[pos].0];
        return Ok((Segment::Key(key.to_string()), pos + 1));
    }

    let start = pos;
    while pos < chars.len() && chars[pos].1 != ']' {
        pos += 1;
    }
    if pos == chars.len() {
        return Err(PathError::UnterminatedBracket(open_offset));
    }
    let inner = &text[chars[start].0..chars[pos].0];
    let segment = if inner.is_empty() {
        Segment::AnyIndex
    } else if let Ok(index) = inner.parse::<usize>() {
        Segment::Index(index)
    } else {
        Segment::Key(inner.to_string())
    };
    Ok((segment, pos + 1))
}

/// Immutable breadcrumb for one traversal position.
///
/// Cloning is cheap; appending copies the parent segments once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Arc<[Segment]>,
}

impl Default for Path {
    fn default() -> Self {
        Self::from_segments(Vec::new())
    }
}

impl Path {
    /// The root position.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, PathError> {
        Ok(Self::from_segments(parse_path(text)?))
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self::from_segments(segments)
    }

    pub fn member(&self, name: &str) -> Self {
        self.push(Segment::Member(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    /// Appends a dictionary key that has already been rendered for display.
    pub fn key(&self, rendered: impl Into<String>) -> Self {
        self.push(Segment::Key(rendered.into()))
    }

    /// Name of the last member segment, if the path ends on a member.
    pub fn last_member(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Member(name)) => Some(name),
            _ => None,
        }
    }

    /// Member names only, with indices and keys dropped.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Member(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Compares member names only, so `Items[0].Name` matches `Items[].Name`.
    pub fn same_members(&self, other: &Path) -> bool {
        self.member_names().eq(other.member_names())
    }

    /// True when this path's member names are a prefix of `other`'s.
    pub fn is_member_prefix_of(&self, other: &Path) -> bool {
        let mut theirs = other.member_names();
        self.member_names().all(|name| theirs.next() == Some(name))
    }

    /// Renders the path behind a root label: `subject.Customers[2].Name`,
    /// `subject[0]`, or just `subject` for the root itself.
    pub fn describe(&self, root: &str) -> String {
        let tail = format_path(&self.segments);
        match self.segments.first() {
            None => root.to_string(),
            Some(Segment::Member(_)) if root.is_empty() => tail,
            Some(Segment::Member(_)) => format!("{root}.{tail}"),
            Some(_) => format!("{root}{tail}"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(&self.segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_matrix() {
        assert_eq!(
            parse_path("Customers[2].Name").unwrap(),
            vec![
                Segment::Member("Customers".into()),
                Segment::Index(2),
                Segment::Member("Name".into())
            ]
        );
        assert_eq!(
            format_path(&parse_path("Roles[\"admin\"][1]").unwrap()),
            "Roles[\"admin\"][1]"
        );
        assert_eq!(
            parse_path("Items[].Price").unwrap()[1],
            Segment::AnyIndex
        );
        assert_eq!(parse_path("[0].Name").unwrap()[0], Segment::Index(0));
        assert_eq!(parse_path("Map[key]").unwrap()[1], Segment::Key("key".into()));
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert_eq!(parse_path(""), Err(PathError::Empty));
        assert_eq!(parse_path("a..b"), Err(PathError::EmptyMember(2)));
        assert_eq!(parse_path(".a"), Err(PathError::EmptyMember(0)));
        assert_eq!(parse_path("a."), Err(PathError::EmptyMember(2)));
        assert_eq!(parse_path("a[1"), Err(PathError::UnterminatedBracket(1)));
        assert_eq!(parse_path("a[\"x]"), Err(PathError::UnterminatedKey(2)));
        assert!(matches!(
            parse_path("a[1]b"),
            Err(PathError::UnexpectedCharacter { found: 'b', .. })
        ));
    }

    #[test]
    fn quoted_keys_round_trip_escapes() {
        assert_eq!(quote_key("a\"b"), "\"a\\\"b\"");
        assert_eq!(unquote_key("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote_key("42"), "42");
        let parsed = parse_path("Roles[\"a\\\"]b\"]").unwrap();
        assert_eq!(parsed[1], Segment::Key("\"a\\\"]b\"".into()));
    }

    #[test]
    fn append_never_mutates_parent() {
        let root = Path::root();
        let customers = root.member("Customers");
        let third = customers.index(2);
        let name = third.member("Name");
        assert!(root.is_root());
        assert_eq!(customers.to_string(), "Customers");
        assert_eq!(name.to_string(), "Customers[2].Name");
        assert_eq!(name.depth(), 3);
        assert_eq!(name.last_member(), Some("Name"));
    }

    #[test]
    fn describe_joins_root_label() {
        assert_eq!(Path::root().describe("subject"), "subject");
        assert_eq!(Path::root().index(0).describe("subject"), "subject[0]");
        assert_eq!(
            Path::root().member("Roles").key("\"admin\"").index(1).describe("subject"),
            "subject.Roles[\"admin\"][1]"
        );
        assert_eq!(Path::root().member("Name").describe(""), "Name");
    }

    #[test]
    fn member_matching_ignores_indices() {
        let concrete = Path::root().member("Items").index(3).member("Price");
        let pattern = Path::parse("Items[].Price").unwrap();
        assert!(concrete.same_members(&pattern));
        assert!(Path::parse("Items").unwrap().is_member_prefix_of(&concrete));
        assert!(!Path::parse("Price").unwrap().is_member_prefix_of(&concrete));
        assert!(Path::root().is_member_prefix_of(&concrete));
    }
}
