//! Independent expected ordering for sort verification
//!
//! Numeric columns are parsed as floating point before comparison so that
//! `"10"` sorts after `"9"`. Everything else compares lexicographically
//! under the column's collation. Ties keep capture order; the admin panel
//! is free to order them differently, so comparisons treat tied cells as
//! interchangeable.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::{ColumnMeta, SortDirection, TextCollation};

static LEADING_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("static regex"));

/// Parse the longest numeric prefix of a cell, skipping leading whitespace.
///
/// `"12.5 %"` reads as 12.5 and `"abc"` as `None`.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    LEADING_FLOAT
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

/// Comparison rule for one column, derived from its metadata
#[derive(Debug, Clone, Copy)]
pub struct ColumnComparator<'a> {
    meta: &'a ColumnMeta,
}

impl<'a> ColumnComparator<'a> {
    pub fn new(meta: &'a ColumnMeta) -> Self {
        Self { meta }
    }

    fn key(&self, cell: &str) -> Result<SortKey> {
        if self.meta.kind.is_numeric() {
            return parse_leading_float(cell)
                .map(SortKey::Number)
                .ok_or_else(|| Error::NotNumeric {
                    column: self.meta.name.clone(),
                    value: cell.to_string(),
                });
        }
        Ok(SortKey::Text(match self.meta.collation {
            TextCollation::Binary => cell.to_string(),
            TextCollation::CaseInsensitive => cell.to_lowercase(),
        }))
    }

    fn cmp_keys(a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
            (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
            // A column never mixes key types
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(Self::cmp_keys(&self.key(a)?, &self.key(b)?))
    }

    /// Ascending order of `values`, reversed for descending
    pub fn expected_order(&self, values: &[String], direction: SortDirection) -> Result<Vec<String>> {
        let mut keyed = values
            .iter()
            .map(|v| Ok((self.key(v)?, v.clone())))
            .collect::<Result<Vec<_>>>()?;

        // sort_by is stable
        keyed.sort_by(|(a, _), (b, _)| Self::cmp_keys(a, b));

        let mut ordered: Vec<String> = keyed.into_iter().map(|(_, v)| v).collect();
        if direction == SortDirection::Desc {
            ordered.reverse();
        }
        Ok(ordered)
    }

    /// Index of the first position where `actual` and `expected` disagree.
    ///
    /// Cells that compare equal count as agreeing, so `"1.0"` matches `"1"`
    /// in a numeric column. A length difference diverges at the shorter end.
    pub fn first_divergence(&self, actual: &[String], expected: &[String]) -> Result<Option<usize>> {
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            if self.compare(a, e)? != Ordering::Equal {
                return Ok(Some(i));
            }
        }
        if actual.len() != expected.len() {
            return Ok(Some(actual.len().min(expected.len())));
        }
        Ok(None)
    }
}

/// Expected post-sort sequence for a captured column
pub fn expected_order(meta: &ColumnMeta, values: &[String], direction: SortDirection) -> Result<Vec<String>> {
    ColumnComparator::new(meta).expected_order(values, direction)
}

/// Compare two cells of the same column
pub fn compare_cells(meta: &ColumnMeta, a: &str, b: &str) -> Result<Ordering> {
    ColumnComparator::new(meta).compare(a, b)
}
