//! Expected Count bookkeeping
//!
//! Established once from live grid state, then moved only by confirmed
//! creations and deletions. Never persisted beyond a run.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCount {
    baseline: usize,
    current: usize,
}

impl ExpectedCount {
    pub fn from_baseline(baseline: usize) -> Self {
        Self {
            baseline,
            current: baseline,
        }
    }

    pub fn baseline(&self) -> usize {
        self.baseline
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Count a confirmed creation, returning the new value
    pub fn record_created(&mut self) -> usize {
        self.current += 1;
        self.current
    }

    /// Count `n` confirmed deletions, returning the new value
    pub fn record_deleted(&mut self, n: usize) -> Result<usize> {
        self.current = self
            .current
            .checked_sub(n)
            .ok_or(Error::CountUnderflow {
                current: self.current,
                removed: n,
            })?;
        Ok(self.current)
    }

    /// Rows added (positive) or removed (negative) since the baseline
    pub fn delta(&self) -> i64 {
        self.current as i64 - self.baseline as i64
    }

    /// Whether cleanup brought the grid back to where the suite found it
    pub fn is_restored(&self) -> bool {
        self.current == self.baseline
    }
}
