//! Identifier schemes
//!
//! The set of schemes is open: `HANDLE`, `DOI` and `URL` are built in, any
//! other name is carried as [`IdentifierType::Other`] so plugins can bring
//! their own (e.g. `ISBN`, `ARK`).
//!
//! Names are case-insensitive on input and always rendered upper-case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdentifierTypeError {
    #[error("Identifier type name must not be blank")]
    Blank,

    #[error("Invalid identifier type name: '{0}'")]
    InvalidName(String),
}

/// A validation scheme, used as the registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdentifierType {
    Handle,
    Doi,
    Url,
    /// A scheme introduced by a plugin; the name is stored upper-case
    Other(String),
}

impl IdentifierType {
    /// Built-in schemes, in installation order
    pub const BUILTIN: [IdentifierType; 3] =
        [IdentifierType::Handle, IdentifierType::Doi, IdentifierType::Url];

    /// Returns the canonical scheme name
    pub fn name(&self) -> &str {
        match self {
            IdentifierType::Handle => "HANDLE",
            IdentifierType::Doi => "DOI",
            IdentifierType::Url => "URL",
            IdentifierType::Other(name) => name,
        }
    }

    /// Returns true for the schemes whose capability is always built in
    pub fn is_builtin(&self) -> bool {
        !matches!(self, IdentifierType::Other(_))
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IdentifierType {
    type Err = IdentifierTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierTypeError::Blank);
        }

        if s.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(IdentifierTypeError::InvalidName(s.to_string()));
        }

        let name = s.to_ascii_uppercase();
        Ok(match name.as_str() {
            "HANDLE" => IdentifierType::Handle,
            "DOI" => IdentifierType::Doi,
            "URL" => IdentifierType::Url,
            _ => IdentifierType::Other(name),
        })
    }
}

impl TryFrom<String> for IdentifierType {
    type Error = IdentifierTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdentifierType> for String {
    fn from(ty: IdentifierType) -> Self {
        ty.to_string()
    }
}
