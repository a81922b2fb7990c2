use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::assertion::types::{AssertError, FieldPath, Segment};

/// Parse a field reference.
///
/// Supported forms:
/// - `$` or empty: the whole body
/// - `name`, `user.address.city`
/// - `[0].name`, `data[1].email`, `items[-1]`
/// - `items[*].id`
pub fn parse_field_path(input: &str) -> Result<FieldPath, AssertError> {
    static PART_REGEX: OnceLock<Regex> = OnceLock::new();
    static INDEX_REGEX: OnceLock<Regex> = OnceLock::new();
    let part_re = PART_REGEX
        .get_or_init(|| Regex::new(r"^([^\[\]]*)((?:\[(?:-?\d+|\*)\])*)$").unwrap());
    let index_re = INDEX_REGEX.get_or_init(|| Regex::new(r"\[(-?\d+|\*)\]").unwrap());

    let trimmed = input.trim();
    let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    if rest.is_empty() {
        return Ok(FieldPath::root());
    }

    let mut segments = Vec::new();
    for part in rest.split('.') {
        let caps = part_re
            .captures(part)
            .ok_or_else(|| AssertError::InvalidPath(input.to_string()))?;
        let key = &caps[1];
        let indexes = &caps[2];

        if key.is_empty() && indexes.is_empty() {
            return Err(AssertError::InvalidPath(input.to_string()));
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key.to_string()));
        }
        for index in index_re.captures_iter(indexes) {
            let segment = match &index[1] {
                "*" => Segment::Wildcard,
                n => Segment::Index(
                    n.parse()
                        .map_err(|_| AssertError::InvalidPath(input.to_string()))?,
                ),
            };
            segments.push(segment);
        }
    }

    Ok(FieldPath::new(segments))
}

impl FromStr for FieldPath {
    type Err = AssertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_field_path(s)
    }
}
