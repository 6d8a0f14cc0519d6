//! Baseline Counter

use tracing::info;

use crate::context::GridContext;
use crate::driver::GridDriver;
use crate::error::E2eResult;

/// Reset the grid and record its row count as the suite's ground truth.
///
/// Must run before any mutation; every later count assertion is relative
/// to the value recorded here.
pub async fn establish_baseline(driver: &mut dyn GridDriver, ctx: &mut GridContext) -> E2eResult<usize> {
    let count = driver.reset_and_get_number_of_lines().await?;
    if let Ok(previous) = ctx.expected() {
        info!(
            "Re-establishing baseline for '{}' (was {}, now {})",
            ctx.schema.name,
            previous.current(),
            count
        );
    } else {
        info!("Baseline for '{}': {} rows", ctx.schema.name, count);
    }
    ctx.set_baseline(count);
    Ok(count)
}
