//! GridCheck Common Library
//!
//! Data model shared by the grid verifiers: rows and snapshots, the
//! column-metadata table, Expected Count bookkeeping, independent sort
//! ordering and the pagination state machine.

pub mod count;
pub mod error;
pub mod ordering;
pub mod pagination;
pub mod types;

// Re-export commonly used types
pub use count::ExpectedCount;
pub use error::{Error, Result};
pub use ordering::{compare_cells, expected_order, parse_leading_float, ColumnComparator};
pub use pagination::{PageIndicator, PaginationModel};
pub use types::*;

/// GridCheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
