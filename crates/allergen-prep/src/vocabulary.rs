//! Categorical vocabulary: string value to stable integer code.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::PrepError;

/// A fitted mapping from the distinct values of one categorical column to
/// codes `0..len()`.
///
/// Codes follow the sorted order of the distinct values, so fitting the same
/// data twice yields the same vocabulary regardless of row order. A fitted
/// vocabulary is never extended: unseen values are an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    column: String,
    codes: BTreeMap<String, u32>,
}

impl Vocabulary {
    /// Fit a vocabulary on the training values of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::EmptyColumn`] when `values` yields nothing.
    pub fn fit<'a>(
        column: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, PrepError> {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        if distinct.is_empty() {
            return Err(PrepError::EmptyColumn {
                column: column.to_string(),
            });
        }
        let codes: BTreeMap<String, u32> = distinct
            .into_iter()
            .zip(0u32..)
            .map(|(value, code)| (value.to_string(), code))
            .collect();
        debug!(column, n_categories = codes.len(), "vocabulary fitted");
        Ok(Self {
            column: column.to_string(),
            codes,
        })
    }

    /// Look up the code of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::UnknownCategory`] when `value` was not seen during fitting.
    pub fn transform(&self, value: &str) -> Result<u32, PrepError> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| PrepError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Return the value that maps to `code`, if any.
    #[must_use]
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.codes.keys().nth(code as usize).map(String::as_str)
    }

    /// Return `true` if `value` was seen during fitting.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    /// Return the known values in code order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    /// Return the column this vocabulary was fit on.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Return the number of known values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Always `false` for a fitted vocabulary; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
