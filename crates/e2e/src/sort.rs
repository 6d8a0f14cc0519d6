//! Sort Verifier
//!
//! Captures a column, issues the sort, captures it again and compares the
//! result with an independently computed order. Rows tied on the sort
//! column may come back in any order.

use gridcheck_common::{ColumnComparator, SortInstruction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::GridContext;
use crate::driver::GridDriver;
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOutcome {
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// Sort and check the column against its expected order.
///
/// When every row is on the page, the sorted page must be the captured
/// values in expected order. When rows span several pages the sort brings
/// other rows onto the page, so only the order of the page itself is checked.
pub async fn verify_sort(
    driver: &mut dyn GridDriver,
    ctx: &GridContext,
    instruction: &SortInstruction,
    check_idempotent: bool,
) -> E2eResult<SortOutcome> {
    let meta = ctx.column(&instruction.column)?;
    if !meta.sortable {
        return Err(gridcheck_common::Error::NotSortable(meta.name.clone()).into());
    }
    let comparator = ColumnComparator::new(meta);
    let label = instruction.to_string();

    let before = driver.get_all_rows_column_content(&instruction.column).await?;
    let total = driver.get_number_of_element_in_grid().await?;
    let whole_grid = total <= before.len();

    driver.sort_table(&instruction.column, instruction.direction).await?;
    let after = driver.get_all_rows_column_content(&instruction.column).await?;
    debug!("Sort {}: {:?} -> {:?}", label, before, after);

    let expected = if whole_grid {
        if after.len() != before.len() {
            return Err(E2eError::SortRowSet {
                instruction: label,
                before: before.len(),
                after: after.len(),
            });
        }
        comparator.expected_order(&before, instruction.direction)?
    } else {
        debug!("Sort {}: {} rows span several pages, checking the page order", label, total);
        comparator.expected_order(&after, instruction.direction)?
    };
    if let Some(row) = comparator.first_divergence(&after, &expected)? {
        return Err(E2eError::SortMismatch {
            instruction: label,
            row: row + 1,
            expected: expected[row].clone(),
            actual: after[row].clone(),
        });
    }

    if check_idempotent {
        driver.sort_table(&instruction.column, instruction.direction).await?;
        let again = driver.get_all_rows_column_content(&instruction.column).await?;
        if let Some(row) = comparator.first_divergence(&again, &after)? {
            return Err(E2eError::SortMismatch {
                instruction: format!("{} (repeated)", label),
                row: row + 1,
                expected: after.get(row).cloned().unwrap_or_default(),
                actual: again.get(row).cloned().unwrap_or_default(),
            });
        }
    }

    info!("Sort {} on '{}': {} row(s) in order", label, ctx.schema.name, after.len());
    Ok(SortOutcome { before, after })
}
