//! Bulk status and bulk delete checks
//!
//! Both act on whatever rows the grid currently shows, so a suite normally
//! filters first and resets afterwards.

use tracing::info;

use crate::context::{check_message, GridContext};
use crate::driver::GridDriver;
use crate::error::{E2eError, E2eResult};

/// Set the status of every visible row, then read each row back.
///
/// `bound` caps how many rows the action may touch; it defaults to the rows
/// on the current page before the action.
pub async fn bulk_set_status(
    driver: &mut dyn GridDriver,
    ctx: &GridContext,
    enabled: bool,
    bound: Option<usize>,
) -> E2eResult<usize> {
    let status_column = ctx
        .schema
        .status_column
        .clone()
        .ok_or(E2eError::NoStatusColumn)?;
    let bound = match bound {
        Some(b) => b,
        None => page_rows(driver, ctx).await?,
    };
    let action = if enabled { "bulk enable" } else { "bulk disable" };

    let message = driver.bulk_set_status(enabled).await?;
    check_message(action, ctx.messages.status_updated.as_deref(), &message)?;

    let rows = driver.get_all_rows_column_content(&status_column).await?.len();
    if rows > bound {
        return Err(E2eError::BulkBound { visible: rows, bound });
    }

    for row in 1..=rows {
        let actual = driver.get_status(row).await?;
        if actual != enabled {
            return Err(E2eError::StatusMismatch {
                row,
                expected: enabled,
                actual,
            });
        }
    }

    info!("{} on '{}': {} row(s) confirmed", action, ctx.schema.name, rows);
    Ok(rows)
}

/// Delete every row on the current page and confirm the reset count dropped
/// by `affected`, defaulting to the number of rows the page showed beforehand.
pub async fn bulk_delete(
    driver: &mut dyn GridDriver,
    ctx: &mut GridContext,
    affected: Option<usize>,
) -> E2eResult<usize> {
    let prior = ctx.count()?;
    let affected = match affected {
        Some(n) => n,
        None => page_rows(driver, ctx).await?,
    };
    let expected = prior.checked_sub(affected).ok_or_else(|| {
        E2eError::Driver(format!(
            "bulk delete of {} row(s) exceeds the expected count {}",
            affected, prior
        ))
    })?;

    let message = driver.delete_with_bulk_actions().await?;
    check_message("bulk delete", ctx.messages.bulk_deleted.as_deref(), &message)?;

    let actual = driver.reset_and_get_number_of_lines().await?;
    if actual != expected {
        return Err(E2eError::CountMismatch {
            stage: "bulk delete".to_string(),
            expected,
            actual,
        });
    }

    let current = ctx.expected_mut()?.record_deleted(affected)?;
    info!(
        "Bulk delete on '{}': {} row(s) removed, count now {}",
        ctx.schema.name, affected, current
    );
    Ok(current)
}

/// Rows on the current page; select-all only reaches these
async fn page_rows(driver: &mut dyn GridDriver, ctx: &GridContext) -> E2eResult<usize> {
    Ok(driver.get_all_rows_column_content(&ctx.schema.key_column).await?.len())
}
