//! Pagination Verifier
//!
//! Checks the "(page P / N)" indicator against `PaginationModel`. The
//! verifier never pushes past the last or first page; a navigation that
//! would leave `[1, N]` is skipped and only the model is consulted.

use gridcheck_common::{PageIndicator, PaginationModel};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::GridContext;
use crate::driver::GridDriver;
use crate::error::{E2eError, E2eResult};

/// One pagination action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStep {
    Limit(usize),
    Next,
    Previous,
}

impl PaginationStep {
    fn label(&self) -> String {
        match self {
            PaginationStep::Limit(size) => format!("limit {}", size),
            PaginationStep::Next => "next".to_string(),
            PaginationStep::Previous => "previous".to_string(),
        }
    }
}

fn check_indicator(action: &str, expected: PageIndicator, text: &str) -> E2eResult<PageIndicator> {
    let actual = PageIndicator::parse(text)?;
    if actual != expected {
        return Err(E2eError::PaginationMismatch {
            action: action.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(actual)
}

fn model_mut(ctx: &mut GridContext) -> E2eResult<&mut PaginationModel> {
    ctx.pagination
        .as_mut()
        .ok_or_else(|| E2eError::Driver("no page size selected; add a limit step first".to_string()))
}

/// Change the page size: expect page 1 of `ceil(count / size)`
pub async fn select_limit(driver: &mut dyn GridDriver, ctx: &mut GridContext, size: usize) -> E2eResult<PageIndicator> {
    let model = PaginationModel::new(ctx.count()?, size)?;
    let text = driver.select_pagination_limit(size).await?;
    let indicator = check_indicator(&PaginationStep::Limit(size).label(), model.indicator(), &text)?;
    ctx.pagination = Some(model);
    Ok(indicator)
}

pub async fn next(driver: &mut dyn GridDriver, ctx: &mut GridContext) -> E2eResult<PageIndicator> {
    let model = model_mut(ctx)?;
    if model.is_last_page() {
        warn!("Already on the last page {}; not navigating next", model.indicator());
        return Ok(model.indicator());
    }
    let mut moved = *model;
    let expected = moved.next();
    let text = driver.pagination_next().await?;
    let indicator = check_indicator("next", expected, &text)?;
    *model_mut(ctx)? = moved;
    Ok(indicator)
}

pub async fn previous(driver: &mut dyn GridDriver, ctx: &mut GridContext) -> E2eResult<PageIndicator> {
    let model = model_mut(ctx)?;
    if model.is_first_page() {
        warn!("Already on the first page {}; not navigating previous", model.indicator());
        return Ok(model.indicator());
    }
    let mut moved = *model;
    let expected = moved.previous();
    let text = driver.pagination_previous().await?;
    let indicator = check_indicator("previous", expected, &text)?;
    *model_mut(ctx)? = moved;
    Ok(indicator)
}

pub async fn apply_step(
    driver: &mut dyn GridDriver,
    ctx: &mut GridContext,
    step: PaginationStep,
) -> E2eResult<PageIndicator> {
    match step {
        PaginationStep::Limit(size) => select_limit(driver, ctx, size).await,
        PaginationStep::Next => next(driver, ctx).await,
        PaginationStep::Previous => previous(driver, ctx).await,
    }
}

/// Run a navigation sequence, stopping at the first divergence
pub async fn walk(
    driver: &mut dyn GridDriver,
    ctx: &mut GridContext,
    steps: &[PaginationStep],
) -> E2eResult<Vec<PageIndicator>> {
    let mut seen = Vec::with_capacity(steps.len());
    for step in steps {
        seen.push(apply_step(driver, ctx, *step).await?);
    }
    if let Some(last) = seen.last() {
        info!("Pagination walk on '{}' ended at {}", ctx.schema.name, last);
    }
    Ok(seen)
}
