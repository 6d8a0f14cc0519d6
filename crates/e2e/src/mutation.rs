//! Mutation Sequence
//!
//! Every confirmed creation must raise the grid count by exactly one and
//! every deletion lower it by exactly one. A success message without the
//! matching count change is a refresh or duplicate-detection defect and is
//! reported, never retried.

use gridcheck_common::{FilterPredicate, Row};
use tracing::{debug, info};

use crate::context::{check_message, GridContext};
use crate::driver::GridDriver;
use crate::error::{E2eError, E2eResult};

fn expect_count(stage: &str, expected: usize, actual: usize) -> E2eResult<()> {
    if expected != actual {
        return Err(E2eError::CountMismatch {
            stage: stage.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn describe(draft: &Row, ctx: &GridContext) -> String {
    // Prefer a human column over the (usually server-assigned) key
    draft
        .columns()
        .find(|(c, _)| *c != ctx.schema.key_column)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| "row".to_string())
}

/// Create one row and confirm the count moved from `n` to `n + 1`
pub async fn create_row(driver: &mut dyn GridDriver, ctx: &mut GridContext, draft: &Row) -> E2eResult<usize> {
    let prior = ctx.count()?;
    let stage = format!("create {}", describe(draft, ctx));

    let message = driver.create_row(draft).await?;
    check_message(&stage, ctx.messages.created.as_deref(), &message)?;

    let actual = driver.reset_and_get_number_of_lines().await?;
    expect_count(&stage, prior + 1, actual)?;

    let current = ctx.expected_mut()?.record_created();
    debug!("{}: count {} -> {}", stage, prior, current);
    Ok(current)
}

/// Create rows in order, stopping at the first failure
pub async fn create_rows(driver: &mut dyn GridDriver, ctx: &mut GridContext, drafts: &[Row]) -> E2eResult<usize> {
    let start = ctx.count()?;
    for draft in drafts {
        create_row(driver, ctx, draft).await?;
    }
    let current = ctx.count()?;
    info!("Created {} row(s) in '{}' ({} -> {})", drafts.len(), ctx.schema.name, start, current);
    Ok(current)
}

/// Edit a visible row; the count must not move
pub async fn update_row(
    driver: &mut dyn GridDriver,
    ctx: &mut GridContext,
    row: usize,
    draft: &Row,
) -> E2eResult<usize> {
    let prior = ctx.count()?;
    let stage = format!("update row {}", row);

    let message = driver.update_row(row, draft).await?;
    check_message(&stage, ctx.messages.updated.as_deref(), &message)?;

    let actual = driver.reset_and_get_number_of_lines().await?;
    expect_count(&stage, prior, actual)?;
    Ok(actual)
}

/// Delete a visible row and confirm the count moved from `n` to `n - 1`
pub async fn delete_row(driver: &mut dyn GridDriver, ctx: &mut GridContext, row: usize) -> E2eResult<usize> {
    let prior = ctx.count()?;
    let stage = format!("delete row {}", row);
    let expected = prior
        .checked_sub(1)
        .ok_or_else(|| E2eError::Driver(format!("{}: grid is expected to be empty", stage)))?;

    let message = driver.delete_row(row).await?;
    check_message(&stage, ctx.messages.deleted.as_deref(), &message)?;

    let actual = driver.reset_and_get_number_of_lines().await?;
    expect_count(&stage, expected, actual)?;

    let current = ctx.expected_mut()?.record_deleted(1)?;
    debug!("{}: count {} -> {}", stage, prior, current);
    Ok(current)
}

/// Narrow the grid to one entity, confirm it is on row 1, then delete it
pub async fn delete_matching(
    driver: &mut dyn GridDriver,
    ctx: &mut GridContext,
    predicate: &FilterPredicate,
) -> E2eResult<usize> {
    driver
        .filter_table(predicate.filter_type, &predicate.column, &predicate.value)
        .await?;

    let first = match driver.get_text_column(1, &predicate.column).await {
        Ok(first) if predicate.matches(&first) => Ok(()),
        Ok(first) => Err(E2eError::FilterContent {
            predicate: predicate.to_string(),
            row: 1,
            actual: first,
        }),
        Err(e) => Err(e),
    };
    if let Err(e) = first {
        // Leave the grid unfiltered before reporting
        driver.reset_and_get_number_of_lines().await?;
        return Err(e);
    }

    delete_row(driver, ctx, 1).await
}
