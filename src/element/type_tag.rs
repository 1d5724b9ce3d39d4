//! Type tags describing the payload shape of an element.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CONTAINER_PREFIX: &str = "set<";
const CONTAINER_SUFFIX: &str = ">";

/// TypeTag is the discriminator describing the shape of an element's payload.
///
/// A tag is either a plain named shape (`text`, `number`, `enum`, ...) or a
/// container wrapping exactly one inner tag (`set<text>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeTag {
    Plain(String),
    Container(Box<TypeTag>),
}

impl TypeTag {
    /// Creates a plain tag.
    pub fn plain(name: impl Into<String>) -> Self {
        TypeTag::Plain(name.into())
    }

    /// Creates a container tag wrapping the given inner tag.
    pub fn container(inner: TypeTag) -> Self {
        TypeTag::Container(Box::new(inner))
    }

    /// Returns true if this tag is a container.
    pub fn is_container(&self) -> bool {
        matches!(self, TypeTag::Container(_))
    }

    /// Returns the tag with one container level stripped, or itself when plain.
    pub fn element_tag(&self) -> &TypeTag {
        match self {
            TypeTag::Container(inner) => &**inner,
            TypeTag::Plain(_) => self,
        }
    }

    /// Returns true if an element can change from `self` to `other` in place.
    ///
    /// Tags are compatible when identical, or when they agree after stripping
    /// one container level from one side: `set<text>` is compatible with
    /// `text` and `set<set<text>>` with `set<text>`, but `set<text>` is not
    /// compatible with `set<number>`.
    pub fn is_compatible_with(&self, other: &TypeTag) -> bool {
        self == other || self.element_tag() == other || self == other.element_tag()
    }
}

impl Default for TypeTag {
    fn default() -> Self {
        TypeTag::plain("text")
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Plain(name) => write!(f, "{}", name),
            TypeTag::Container(inner) => write!(f, "{}{}{}", CONTAINER_PREFIX, inner, CONTAINER_SUFFIX),
        }
    }
}

/// TypeTagParseError is returned for malformed textual tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type tag '{input}': {reason}")]
pub struct TypeTagParseError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for TypeTag {
    type Err = TypeTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = |reason| TypeTagParseError {
            input: s.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(err("tag is empty"));
        }

        if let Some(rest) = trimmed.strip_prefix(CONTAINER_PREFIX) {
            let inner = rest
                .strip_suffix(CONTAINER_SUFFIX)
                .ok_or_else(|| err("unterminated container"))?;
            let inner: TypeTag = inner.parse().map_err(|_| err("invalid container element"))?;
            return Ok(TypeTag::container(inner));
        }

        if trimmed.contains(['<', '>']) {
            return Err(err("unexpected angle bracket"));
        }

        Ok(TypeTag::plain(trimmed))
    }
}

impl TryFrom<String> for TypeTag {
    type Error = TypeTagParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}
