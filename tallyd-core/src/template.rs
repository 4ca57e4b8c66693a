//! File-name templates for input logs.
//!
//! A template is a path with strftime placeholders, optionally followed by a
//! query suffix that shifts the timestamp before substitution:
//!
//! ```text
//! /var/log/apache/access-%Y-%m-%d-%H.log?ts=-3600&ts-name-only=true
//! ```
//!
//! `ts` is a signed shift in seconds. With `ts-name-only=true` the shift only
//! picks the file name; record time bounds keep the unshifted timestamp.
//! A bare integer suffix (`?-3600`) is accepted as a shorthand for `ts=`.

use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, NaiveDateTime};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const SHIFT_KEY: &str = "ts";
const NAME_ONLY_KEY: &str = "ts-name-only";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,

    #[error("template '{template}' has an invalid strftime placeholder")]
    Placeholder { template: String },

    #[error("template '{template}': invalid value '{value}' for '{key}'")]
    InvalidValue {
        template: String,
        key: String,
        value: String,
    },

    #[error("template '{template}': unknown option '{key}'")]
    UnknownOption { template: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    raw: String,
    pattern: String,
    shift: i64,
    name_only: bool,
}

impl FileTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let (pattern, query) = match raw.split_once('?') {
            Some((pattern, query)) => (pattern, Some(query)),
            None => (raw, None),
        };
        if pattern.is_empty() {
            return Err(TemplateError::Empty);
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(TemplateError::Placeholder {
                template: raw.to_string(),
            });
        }

        let mut template = Self {
            raw: raw.to_string(),
            pattern: pattern.to_string(),
            shift: 0,
            name_only: false,
        };
        if let Some(query) = query {
            template.apply_query(query)?;
        }
        Ok(template)
    }

    fn apply_query(&mut self, query: &str) -> Result<(), TemplateError> {
        if let Ok(shift) = query.parse::<i64>() {
            self.shift = self.checked_shift(SHIFT_KEY, query, shift)?;
            return Ok(());
        }

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let invalid = || TemplateError::InvalidValue {
                template: self.raw.clone(),
                key: key.to_string(),
                value: value.to_string(),
            };
            match key {
                SHIFT_KEY => {
                    let shift = value.parse().map_err(|_| invalid())?;
                    self.shift = self.checked_shift(key, value, shift)?;
                }
                NAME_ONLY_KEY => self.name_only = value.parse().map_err(|_| invalid())?,
                _ => {
                    return Err(TemplateError::UnknownOption {
                        template: self.raw.clone(),
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn checked_shift(&self, key: &str, value: &str, shift: i64) -> Result<i64, TemplateError> {
        match Duration::try_seconds(shift) {
            Some(_) => Ok(shift),
            None => Err(TemplateError::InvalidValue {
                template: self.raw.clone(),
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn shift(&self) -> i64 {
        self.shift
    }

    pub fn name_only(&self) -> bool {
        self.name_only
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Concrete path for the round or period boundary at `dt`.
    pub fn resolve(&self, dt: NaiveDateTime) -> PathBuf {
        let shifted = dt + Duration::seconds(self.shift);
        PathBuf::from(shifted.format(&self.pattern).to_string())
    }

    /// Timestamp that bounds record matching for the boundary at `dt`.
    pub fn time_bound(&self, dt: NaiveDateTime) -> NaiveDateTime {
        if self.name_only {
            dt
        } else {
            dt + Duration::seconds(self.shift)
        }
    }
}

impl fmt::Display for FileTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
