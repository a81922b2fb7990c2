use std::fmt;

/// Assertion failure, carrying what was checked and what was found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssertError {
    #[error("{subject}: expected {expected}, but got {actual}")]
    Mismatch {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Field '{0}' should not be null")]
    NullField(String),

    #[error("{subject} should be a list, but got {actual}")]
    NotAList { subject: String, actual: String },

    #[error("{0} should not be empty")]
    EmptyList(String),

    #[error("Item {index} is missing field '{field}'")]
    MissingField { index: usize, field: String },

    #[error("Response time {actual_ms}ms exceeded {max_ms}ms")]
    TooSlow { actual_ms: u128, max_ms: u128 },

    #[error("Invalid field path '{0}'")]
    InvalidPath(String),

    #[error("Response body is not JSON")]
    NotJson,
}

impl AssertError {
    pub fn mismatch(
        subject: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        AssertError::Mismatch {
            subject: subject.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member; applied to a list it is taken from every element
    Key(String),
    /// List element, negative counts from the end
    Index(i64),
    /// Every element of a list, or every value of an object
    Wildcard,
}

/// Typed reference to a value inside a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath {
    pub(crate) segments: Vec<Segment>,
}

impl FieldPath {
    /// The whole body.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn key(name: impl Into<String>) -> Self {
        Self::new(vec![Segment::Key(name.into())])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// This path followed by `segment`.
    pub fn join(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Wildcard => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}
