// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vehicle plate identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shortest accepted plate
pub const MIN_PLATE_LEN: usize = 7;
/// Longest accepted plate
pub const MAX_PLATE_LEN: usize = 8;

/// Errors from plate parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlateError {
    #[error("plate length {len} outside {MIN_PLATE_LEN}..={MAX_PLATE_LEN}: {plate:?}")]
    Length { plate: String, len: usize },
    #[error("plate contains non-alphanumeric character {ch:?}: {plate:?}")]
    InvalidChar { plate: String, ch: char },
}

/// Normalized vehicle identifier: uppercase ASCII alphanumeric, 7 or 8 chars.
///
/// Used as both the cooldown key and the authorization lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate(String);

impl Plate {
    /// Trim, uppercase and validate a plate string
    pub fn parse(raw: &str) -> Result<Self, PlateError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if let Some(ch) = normalized.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(PlateError::InvalidChar {
                plate: normalized,
                ch,
            });
        }

        let len = normalized.len();
        if !(MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&len) {
            return Err(PlateError::Length {
                plate: normalized,
                len,
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Plate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Plate {
    type Error = PlateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.0
    }
}

impl std::str::FromStr for Plate {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "plate_tests.rs"]
mod tests;
