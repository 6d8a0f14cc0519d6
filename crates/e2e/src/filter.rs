//! Filter Verifier
//!
//! Filtering must never increase the visible row count, and every visible
//! row must satisfy the predicate. The filter is always cleared afterwards
//! and the count re-checked against Expected Count so that filter state
//! cannot leak into the next case.

use gridcheck_common::{ColumnKind, FilterPredicate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::GridContext;
use crate::driver::GridDriver;
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Count the grid reported under the filter
    pub visible: usize,
    /// Rows whose content was checked (the current page)
    pub checked: usize,
}

/// Build a predicate for a column of the suite's grid
pub fn predicate(ctx: &GridContext, column: &str, value: &str) -> E2eResult<FilterPredicate> {
    let meta = ctx.column(column)?;
    if !meta.filterable {
        return Err(E2eError::Driver(format!("column '{}' has no filter", column)));
    }
    Ok(FilterPredicate::for_column(meta, value))
}

fn reads_status(ctx: &GridContext, predicate: &FilterPredicate) -> bool {
    predicate.kind == ColumnKind::Boolean && ctx.schema.status_column.as_deref() == Some(predicate.column.as_str())
}

/// Apply the filter and check bound and content. Leaves the filter active.
pub async fn apply_and_check(
    driver: &mut dyn GridDriver,
    ctx: &GridContext,
    predicate: &FilterPredicate,
    require_rows: bool,
) -> E2eResult<FilterOutcome> {
    let bound = ctx.count()?;
    debug!("Filtering '{}' by {}", ctx.schema.name, predicate);

    driver
        .filter_table(predicate.filter_type, &predicate.column, &predicate.value)
        .await?;

    let visible = driver.get_number_of_element_in_grid().await?;
    if visible > bound {
        return Err(E2eError::FilterBound {
            predicate: predicate.to_string(),
            visible,
            bound,
        });
    }
    if require_rows && visible == 0 {
        return Err(E2eError::FilterEmpty {
            predicate: predicate.to_string(),
        });
    }

    let cells = driver.get_all_rows_column_content(&predicate.column).await?;
    if reads_status(ctx, predicate) {
        for row in 1..=cells.len() {
            let status = driver.get_status(row).await?;
            if !predicate.matches_flag(status) {
                return Err(E2eError::FilterContent {
                    predicate: predicate.to_string(),
                    row,
                    actual: status.to_string(),
                });
            }
        }
    } else {
        for (i, cell) in cells.iter().enumerate() {
            if !predicate.matches(cell) {
                return Err(E2eError::FilterContent {
                    predicate: predicate.to_string(),
                    row: i + 1,
                    actual: cell.clone(),
                });
            }
        }
    }

    Ok(FilterOutcome {
        visible,
        checked: cells.len(),
    })
}

/// Clear all filters and confirm the grid is back to Expected Count
pub async fn clear_and_recheck(driver: &mut dyn GridDriver, ctx: &GridContext) -> E2eResult<usize> {
    let expected = ctx.count()?;
    let actual = driver.reset_and_get_number_of_lines().await?;
    if actual != expected {
        return Err(E2eError::FilterLeak { expected, actual });
    }
    Ok(actual)
}

/// Apply, check, then clear. The clear runs even when the check fails; the
/// first failure is the one reported.
pub async fn verify_filter(
    driver: &mut dyn GridDriver,
    ctx: &GridContext,
    predicate: &FilterPredicate,
    require_rows: bool,
) -> E2eResult<FilterOutcome> {
    let checked = apply_and_check(driver, ctx, predicate, require_rows).await;
    let cleared = clear_and_recheck(driver, ctx).await;

    let outcome = checked?;
    cleared?;
    info!(
        "Filter {} on '{}': {} row(s), {} checked",
        predicate, ctx.schema.name, outcome.visible, outcome.checked
    );
    Ok(outcome)
}
