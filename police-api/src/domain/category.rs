//! Crime and outcome categories.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::error::Result;
use crate::hydrate::{self, RawRecord};

/// Pseudo-category the API uses to mean "every category".
pub const ALL_CRIME: &str = "all-crime";

/// A crime category, valid for the reporting month it was listed under.
///
/// Identity is the slug (`url`).
#[derive(Debug, Clone)]
pub struct CrimeCategory {
    /// Slug, e.g. "anti-social-behaviour"
    pub url: String,
    /// Human-readable name
    pub name: String,
}

impl CrimeCategory {
    /// Build a category from its listing entry.
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            url: hydrate::required_string(raw, "url")?,
            name: hydrate::string(raw, "name").unwrap_or_default(),
        })
    }

    /// Identifier of the category; the same as its slug.
    pub fn id(&self) -> &str {
        &self.url
    }
}

impl PartialEq for CrimeCategory {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for CrimeCategory {}

impl Hash for CrimeCategory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl AsRef<str> for CrimeCategory {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CrimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An outcome category.
///
/// Full outcome histories carry `{code, name}`; the outcome status embedded
/// in street-level crimes only carries the name. Identity is the code when
/// there is one, the name otherwise.
#[derive(Debug, Clone)]
pub struct OutcomeCategory {
    /// Code, e.g. "under-investigation"
    pub code: Option<String>,
    /// Human-readable name
    pub name: String,
}

impl OutcomeCategory {
    /// Build a category from a `{code, name}` object or a bare name.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(raw) => Some(Self {
                code: hydrate::string(raw, "code"),
                name: hydrate::string(raw, "name").unwrap_or_default(),
            }),
            Value::String(name) => Some(Self {
                code: None,
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Identifier of the category.
    pub fn id(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }
}

impl PartialEq for OutcomeCategory {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for OutcomeCategory {}

impl Hash for OutcomeCategory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
