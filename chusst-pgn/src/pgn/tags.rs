use super::diagnostic::{DiagnosticKind, Diagnostics};
use super::error::{ErrorKind, PgnError};

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while1};
use nom::character::complete::{char, space0, space1};
use nom::combinator::{map, opt, value};
use nom::sequence::{delimited, pair, separated_pair};
use nom::IResult;
use serde::ser::SerializeMap;
use serde::Serialize;

#[derive(Clone, Debug, Eq)]
pub struct TagPair {
    pub name: String,
    pub value: String,
    /// Byte offset of the opening `[`.
    pub offset: usize,
}

impl PartialEq for TagPair {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl TagPair {
    pub fn new(name: &str, value: &str) -> Self {
        TagPair {
            name: name.to_string(),
            value: value.to_string(),
            offset: 0,
        }
    }

    pub fn to_pgn(&self) -> String {
        format!(
            "[{} \"{}\"]",
            self.name,
            self.value.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }
}

/// Tag pairs in the order they first appeared.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagPairs(Vec<TagPair>);

impl TagPairs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_pair(name).map(|pair| pair.value.as_str())
    }

    pub fn get_pair(&self, name: &str) -> Option<&TagPair> {
        self.0.iter().find(|pair| pair.name == name)
    }

    /// Adds a tag pair. A pair with the same name is replaced in place and returned.
    pub fn insert(&mut self, pair: TagPair) -> Option<TagPair> {
        match self.0.iter_mut().find(|existing| existing.name == pair.name) {
            Some(existing) => Some(std::mem::replace(existing, pair)),
            None => {
                self.0.push(pair);
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagPair> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_pgn(&self) -> String {
        self.0
            .iter()
            .map(TagPair::to_pgn)
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub(crate) fn rebase(&mut self, base: usize) {
        for pair in &mut self.0 {
            pair.offset += base;
        }
    }
}

impl Serialize for TagPairs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for pair in &self.0 {
            map.serialize_entry(&pair.name, &pair.value)?;
        }
        map.end()
    }
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn tag_value(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((value("\\", tag("\\")), value("\"", tag("\"")))),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn pgn_tag(input: &str) -> IResult<&str, (&str, String)> {
    delimited(
        pair(char('['), space0),
        separated_pair(tag_name, space1, tag_value),
        pair(space0, char(']')),
    )(input)
}

/// Reads the tag section at the start of `text`.
///
/// Returns the tags and the byte offset where the movetext starts. Blank lines, `%` escape lines
/// and `;` comment lines are skipped; the first other line not starting with `[` begins the
/// movetext.
pub(crate) fn extract_tags(
    text: &str,
    diagnostics: &mut Diagnostics,
) -> Result<(TagPairs, usize), PgnError> {
    let mut tags = TagPairs::default();
    let mut line_offset = 0;

    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.trim_end_matches(|c| c == '\n' || c == '\r');
        let offset_of = move |rest: &str| line_offset + line.len() - rest.len();
        let mut rest = line.trim_start();

        if rest.is_empty() || line.starts_with('%') || rest.starts_with(';') {
            line_offset += raw_line.len();
            continue;
        }

        if !rest.starts_with('[') {
            return Ok((tags, offset_of(rest)));
        }

        while !rest.is_empty() && !rest.starts_with(';') {
            let start = offset_of(rest);
            match pgn_tag(rest) {
                Ok((remaining, (name, value))) => {
                    let pair = TagPair {
                        name: name.to_string(),
                        value,
                        offset: start,
                    };
                    if let Some(previous) = tags.insert(pair) {
                        diagnostics.record(
                            DiagnosticKind::DuplicateTag,
                            format!(
                                "tag {} repeated, \"{}\" replaces \"{}\"",
                                name,
                                tags.get(name).unwrap_or_default(),
                                previous.value
                            ),
                            start,
                        );
                    }
                    rest = remaining.trim_start();
                }
                Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
                    return Err(PgnError::new(
                        ErrorKind::MalformedTag,
                        format!("malformed tag pair '{}'", rest),
                        text,
                        offset_of(err.input),
                    ));
                }
                Err(nom::Err::Incomplete(_)) => {
                    return Err(PgnError::new(
                        ErrorKind::MalformedTag,
                        format!("incomplete tag pair '{}'", rest),
                        text,
                        start,
                    ));
                }
            }
        }

        line_offset += raw_line.len();
    }

    Ok((tags, text.len()))
}
