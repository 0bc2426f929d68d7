//! Filters and the post predicate
//!
//! [`FilterState`] holds one value for every [`FilterKey`]; there is no way to
//! build a partial state. [`matches`] decides whether a post is visible.
//!
//! Tri-state filters compare a yes/no/any choice against a boolean property
//! of the post. Free-text filters are case-insensitive regular expressions.
//!
//! ## Invalid patterns
//!
//! A free-text value that does not compile as a regular expression is kept
//! as [`TextPattern::Invalid`] and *fails closed*: the constraint matches no
//! post, so nothing is shown until the pattern is fixed. The predicate never
//! returns an error.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::debug;

use crate::{Result, posts::Post, prelude::*};

/// Filter keys. The string form is the identifier of the matching ui input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterKey {
    H1b,
    Intern,
    Remote,
    Stale,
    Location,
    LocationFilter,
    TextFilter,
}

impl FilterKey {
    /// Keys whose value is any/yes/no
    pub fn is_tri_state(self) -> bool {
        !self.is_text()
    }

    /// Keys whose value is a free-text pattern
    pub fn is_text(self) -> bool {
        matches!(self, Self::LocationFilter | Self::TextFilter)
    }

    /// Parses a key name, returning `UnknownFilterKey` for anything else.
    pub fn parse(key: &str) -> Result<Self> {
        key.parse().ok().context(UnknownFilterKeySnafu { key })
    }
}

/// Value of a tri-state filter
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

impl TriState {
    /// Compares the filter choice with a property of the post.
    pub fn accepts(self, value: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Yes => value,
            Self::No => !value,
        }
    }
}

/// A compiled free-text filter.
#[derive(Clone, Default)]
pub enum TextPattern {
    /// Empty input; matches everything
    #[default]
    Empty,
    /// Case-insensitive regular expression
    Valid(Regex),
    /// Input that failed to compile. Matches nothing.
    Invalid { source: String, error: String },
}

impl TextPattern {
    /// Compiles user input. Never fails: bad input becomes `Invalid`.
    pub fn new(source: &str) -> Self {
        if source.is_empty() {
            return Self::Empty;
        }
        match RegexBuilder::new(source).case_insensitive(true).build() {
            Ok(regex) => Self::Valid(regex),
            Err(err) => {
                debug!(pattern = source, "invalid filter pattern: {err}");
                Self::Invalid {
                    source: source.to_string(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// The text the pattern was compiled from
    pub fn as_str(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Valid(regex) => regex.as_str(),
            Self::Invalid { source, .. } => source,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// The compiled expression, if the pattern is valid
    pub fn regex(&self) -> Option<&Regex> {
        match self {
            Self::Valid(regex) => Some(regex),
            _ => None,
        }
    }

    /// Constraint check on an optional field.
    /// Empty pattern passes anything, including a missing field.
    /// Otherwise the field must be present and contain a match.
    pub fn accepts(&self, haystack: Option<&str>) -> bool {
        match self {
            Self::Empty => true,
            Self::Valid(regex) => haystack.is_some_and(|text| regex.is_match(text)),
            Self::Invalid { .. } => false,
        }
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Valid(regex) => f.debug_tuple("Valid").field(&regex.as_str()).finish(),
            Self::Invalid { source, error } => f
                .debug_struct("Invalid")
                .field("source", source)
                .field("error", error)
                .finish(),
        }
    }
}

/// The current value of every filter. Defaults to "any" and empty patterns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub h1b: TriState,
    pub intern: TriState,
    pub remote: TriState,
    pub stale: TriState,
    /// Whether the post has an address
    pub location: TriState,
    /// Pattern matched against the address
    pub location_filter: TextPattern,
    /// Pattern matched against the post text
    pub text_filter: TextPattern,
}

impl FilterState {
    /// Sets a filter from its string value, as delivered by a ui input.
    ///
    /// Returns `Ok(true)` if the stored value changed, `Ok(false)` if it was
    /// already equal. Tri-state values other than any/yes/no are rejected and
    /// leave the state untouched.
    pub fn set(&mut self, key: FilterKey, value: &str) -> Result<bool> {
        if self.get(key) == value {
            return Ok(false);
        }
        let slot = match key {
            FilterKey::LocationFilter => {
                self.location_filter = TextPattern::new(value);
                return Ok(true);
            }
            FilterKey::TextFilter => {
                self.text_filter = TextPattern::new(value);
                return Ok(true);
            }
            FilterKey::H1b => &mut self.h1b,
            FilterKey::Intern => &mut self.intern,
            FilterKey::Remote => &mut self.remote,
            FilterKey::Stale => &mut self.stale,
            FilterKey::Location => &mut self.location,
        };
        *slot = value.parse().map_err(|_| {
            InvalidFilterSnafu {
                key: key.to_string(),
                value,
                message: "expected any, yes, or no",
            }
            .build()
        })?;
        Ok(true)
    }

    /// Returns the string value of a filter
    pub fn get(&self, key: FilterKey) -> String {
        match key {
            FilterKey::H1b => self.h1b.to_string(),
            FilterKey::Intern => self.intern.to_string(),
            FilterKey::Remote => self.remote.to_string(),
            FilterKey::Stale => self.stale.to_string(),
            FilterKey::Location => self.location.to_string(),
            FilterKey::LocationFilter => self.location_filter.as_str().to_string(),
            FilterKey::TextFilter => self.text_filter.as_str().to_string(),
        }
    }

    /// All keys with their current string values, in key order
    pub fn values(&self) -> Vec<(FilterKey, String)> {
        use strum::IntoEnumIterator;
        FilterKey::iter().map(|key| (key, self.get(key))).collect()
    }

    /// Returns the first free-text filter that failed to compile
    pub fn invalid_pattern(&self) -> Option<(FilterKey, &TextPattern)> {
        [
            (FilterKey::LocationFilter, &self.location_filter),
            (FilterKey::TextFilter, &self.text_filter),
        ]
        .into_iter()
        .find(|(_, pattern)| pattern.is_invalid())
    }
}

/// Returns true if the post passes every active filter.
pub fn matches(post: &Post, filters: &FilterState) -> bool {
    filters.h1b.accepts(post.h1b)
        && filters.intern.accepts(post.intern)
        && filters.remote.accepts(post.remote)
        && filters.stale.accepts(post.is_stale())
        && filters.location.accepts(post.has_address())
        && filters.location_filter.accepts(post.address())
        && filters.text_filter.accepts(Some(post.full_text()))
}
