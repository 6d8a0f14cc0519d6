//! Pagination indicator and its state machine
//!
//! States are "page p of n". `next` moves to `min(p + 1, n)`, `previous` to
//! `max(p - 1, 1)`, and a resize recomputes `n = ceil(count / size)` and
//! returns to page 1. There is no wraparound.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

static INDICATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*page\s+(\d+)\s*/\s*(\d+)\s*\)").expect("static regex"));

/// "(page P / N)" as reported by a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIndicator {
    pub page: usize,
    pub total: usize,
}

impl PageIndicator {
    pub fn new(page: usize, total: usize) -> Self {
        Self { page, total }
    }

    /// Find the first indicator anywhere in `text`
    pub fn parse(text: &str) -> Result<Self> {
        let caps = INDICATOR
            .captures(text)
            .ok_or_else(|| Error::MissingIndicator(text.to_string()))?;

        let number = |i: usize| -> Result<usize> {
            caps[i]
                .parse()
                .map_err(|_| Error::MissingIndicator(text.to_string()))
        };

        Ok(Self {
            page: number(1)?,
            total: number(2)?,
        })
    }
}

impl fmt::Display for PageIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(page {} / {})", self.page, self.total)
    }
}

/// Model of what the indicator should read after each navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationModel {
    count: usize,
    page_size: usize,
    page: usize,
}

impl PaginationModel {
    /// Grid load: page 1 of `ceil(count / page_size)`
    pub fn new(count: usize, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize(page_size));
        }
        Ok(Self {
            count,
            page_size,
            page: 1,
        })
    }

    /// Total pages. An empty grid still renders one page.
    pub fn total_pages(&self) -> usize {
        total_pages(self.count, self.page_size)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages()
    }

    pub fn is_first_page(&self) -> bool {
        self.page <= 1
    }

    pub fn indicator(&self) -> PageIndicator {
        PageIndicator::new(self.page, self.total_pages())
    }

    pub fn next(&mut self) -> PageIndicator {
        self.page = (self.page + 1).min(self.total_pages());
        self.indicator()
    }

    pub fn previous(&mut self) -> PageIndicator {
        self.page = self.page.saturating_sub(1).max(1);
        self.indicator()
    }

    /// Grid reload with a new row count: page 1, same page size
    pub fn reload(&mut self, count: usize) -> PageIndicator {
        self.count = count;
        self.page = 1;
        self.indicator()
    }

    pub fn resize(&mut self, page_size: usize) -> Result<PageIndicator> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize(page_size));
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(self.indicator())
    }
}

/// `ceil(count / page_size)`, floored at 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}
