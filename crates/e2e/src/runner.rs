//! Suite runner: one driver session and one `GridContext` per suite

use std::path::PathBuf;
use std::time::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use gridcheck_common::{Row, SortInstruction};

use crate::baseline::establish_baseline;
use crate::bulk;
use crate::context::GridContext;
use crate::driver::{DriverFactory, GridDriver};
use crate::error::{E2eError, E2eResult, FailureCategory};
use crate::filter;
use crate::mutation;
use crate::pagination;
use crate::sort::verify_sort;
use crate::spec::{FilterSpec, GridSuite, SuiteStep};

pub const RESULTS_FILE: &str = "grid-results.json";

/// Result of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub index: usize,
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub category: Option<FailureCategory>,
}

/// Result of running one suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub name: String,
    pub grid: String,
    pub success: bool,
    pub duration_ms: u64,
    pub baseline: Option<usize>,
    pub final_count: Option<usize>,
    pub restored: bool,
    /// Set when the suite could not start at all
    pub error: Option<String>,
    pub steps: Vec<StepResult>,
}

impl SuiteResult {
    fn aborted(suite: &GridSuite, err: &E2eError) -> Self {
        Self {
            name: suite.name.clone(),
            grid: suite.grid.name.clone(),
            success: false,
            duration_ms: 0,
            baseline: None,
            final_count: None,
            restored: false,
            error: Some(err.to_string()),
            steps: vec![],
        }
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.success)
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// RFC 3339
    pub started_at: String,
    pub duration_ms: u64,
    pub suites: Vec<SuiteResult>,
}

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub suites_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            suites_dir: PathBuf::from("suites"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

pub struct GridRunner {
    factory: Box<dyn DriverFactory>,
    suites_dir: PathBuf,
    output_dir: PathBuf,
}

impl GridRunner {
    pub fn new(factory: impl DriverFactory + 'static, config: RunnerConfig) -> Self {
        Self {
            factory: Box::new(factory),
            suites_dir: config.suites_dir,
            output_dir: config.output_dir,
        }
    }

    /// Run every suite in the suites directory
    pub async fn run_all(&self) -> E2eResult<RunResult> {
        let suites = GridSuite::load_all(&self.suites_dir)?;
        Ok(self.run_suites(&suites).await)
    }

    /// Run suites carrying a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<RunResult> {
        let suites = GridSuite::load_all(&self.suites_dir)?;
        let filtered: Vec<GridSuite> = GridSuite::filter_by_tag(&suites, tag).into_iter().cloned().collect();
        Ok(self.run_suites(&filtered).await)
    }

    /// Run a single suite by name
    pub async fn run_named(&self, name: &str) -> E2eResult<RunResult> {
        let suites = GridSuite::load_all(&self.suites_dir)?;
        let suite = suites
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SuiteParse(format!("Suite not found: {}", name)))?;
        Ok(self.run_suites(std::slice::from_ref(&suite)).await)
    }

    /// Run suites one after another
    pub async fn run_suites(&self, suites: &[GridSuite]) -> RunResult {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();
        let mut results = Vec::with_capacity(suites.len());
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} suite(s)...", suites.len());

        for suite in suites {
            let result = self.run_suite(suite).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                let reason = result
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("{} step(s) failed", result.failed_steps().count()));
                error!("✗ {} - {}", result.name, reason);
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Grid results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        RunResult {
            total: suites.len(),
            passed,
            failed,
            started_at,
            duration_ms,
            suites: results,
        }
    }

    /// Run one suite. Failed steps are recorded and the suite carries on.
    pub async fn run_suite(&self, suite: &GridSuite) -> SuiteResult {
        let start = Instant::now();
        debug!("Running suite: {}", suite.name);

        let mut ctx = match GridContext::new(suite.grid.clone(), suite.messages.clone()) {
            Ok(ctx) => ctx,
            Err(e) => return SuiteResult::aborted(suite, &e),
        };
        let mut driver = match self.factory.open(suite).await {
            Ok(driver) => driver,
            Err(e) => return SuiteResult::aborted(suite, &e),
        };

        let mut steps = Vec::with_capacity(suite.steps.len());
        for (index, step) in suite.steps.iter().enumerate() {
            let name = step.label();
            let step_start = Instant::now();
            let outcome = execute_step(driver.as_mut(), &mut ctx, step).await;
            if step.reloads_grid() {
                ctx.grid_reloaded();
            }
            let duration_ms = step_start.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(()) => {
                    info!("  ✓ {} ({} ms)", name, duration_ms);
                    StepResult {
                        index,
                        name,
                        success: true,
                        duration_ms,
                        error: None,
                        category: None,
                    }
                }
                Err(e) => {
                    error!("  ✗ {} [{:?}] - {}", name, e.category(), e);
                    StepResult {
                        index,
                        name,
                        success: false,
                        duration_ms,
                        error: Some(e.to_string()),
                        category: Some(e.category()),
                    }
                }
            };
            steps.push(result);
        }

        if let Err(e) = driver.close().await {
            warn!("Closing driver '{}' failed: {}", driver.name(), e);
        }

        let (baseline, final_count, restored) = match ctx.expected() {
            Ok(expected) => (Some(expected.baseline()), Some(expected.current()), expected.is_restored()),
            Err(_) => (None, None, false),
        };
        if let (Some(baseline), Some(current)) = (baseline, final_count) {
            if !restored {
                warn!(
                    "Suite '{}' left grid '{}' at {} rows, baseline was {}",
                    suite.name, suite.grid.name, current, baseline
                );
            }
        }

        SuiteResult {
            name: suite.name.clone(),
            grid: suite.grid.name.clone(),
            success: steps.iter().all(|s| s.success),
            duration_ms: start.elapsed().as_millis() as u64,
            baseline,
            final_count,
            restored,
            error: None,
            steps,
        }
    }

    /// Write run results to JSON file
    pub fn write_results(&self, results: &RunResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

async fn apply_filter(driver: &mut dyn GridDriver, ctx: &GridContext, spec: &FilterSpec) -> E2eResult<()> {
    let predicate = filter::predicate(ctx, &spec.column, &spec.value)?;
    driver
        .filter_table(predicate.filter_type, &predicate.column, &predicate.value)
        .await
}

/// Dispatch one suite step to its verifier
pub async fn execute_step(driver: &mut dyn GridDriver, ctx: &mut GridContext, step: &SuiteStep) -> E2eResult<()> {
    match step {
        SuiteStep::Baseline { min } => {
            let count = establish_baseline(driver, ctx).await?;
            if let Some(min) = min {
                if count < *min {
                    return Err(E2eError::Driver(format!(
                        "grid '{}' has {} rows, suite needs at least {}",
                        ctx.schema.name, count, min
                    )));
                }
            }
        }
        SuiteStep::Create { rows, template } => {
            let mut drafts: Vec<Row> = rows.clone();
            if let Some(template) = template {
                drafts.extend(template.expand());
            }
            mutation::create_rows(driver, ctx, &drafts).await?;
        }
        SuiteStep::Update { filter, row, values } => {
            ctx.count()?;
            if let Some(spec) = filter {
                apply_filter(driver, ctx, spec).await?;
            }
            mutation::update_row(driver, ctx, *row, values).await?;
        }
        SuiteStep::Delete { filter } => {
            let predicate = filter::predicate(ctx, &filter.column, &filter.value)?;
            mutation::delete_matching(driver, ctx, &predicate).await?;
        }
        SuiteStep::Filter {
            column,
            value,
            require_rows,
        } => {
            let predicate = filter::predicate(ctx, column, value)?;
            filter::verify_filter(driver, ctx, &predicate, *require_rows).await?;
        }
        SuiteStep::Sort {
            column,
            direction,
            idempotent,
        } => {
            let instruction = SortInstruction::new(column.as_str(), *direction);
            verify_sort(driver, ctx, &instruction, *idempotent).await?;
        }
        SuiteStep::Limit { size } => {
            pagination::select_limit(driver, ctx, *size).await?;
        }
        SuiteStep::Next => {
            pagination::next(driver, ctx).await?;
        }
        SuiteStep::Previous => {
            pagination::previous(driver, ctx).await?;
        }
        SuiteStep::Paginate { walk } => {
            pagination::walk(driver, ctx, walk).await?;
        }
        SuiteStep::BulkStatus {
            filter,
            enabled,
            max_rows,
        } => {
            if let Some(spec) = filter {
                apply_filter(driver, ctx, spec).await?;
            }
            bulk::bulk_set_status(driver, ctx, *enabled, *max_rows).await?;
        }
        SuiteStep::BulkDelete { filter, count } => {
            ctx.count()?;
            if let Some(spec) = filter {
                apply_filter(driver, ctx, spec).await?;
            }
            bulk::bulk_delete(driver, ctx, *count).await?;
        }
        SuiteStep::Reset { restored } => {
            let expected = ctx.count()?;
            let actual = driver.reset_and_get_number_of_lines().await?;
            if actual != expected {
                return Err(E2eError::CountMismatch {
                    stage: "reset".to_string(),
                    expected,
                    actual,
                });
            }
            let baseline = ctx.expected()?.baseline();
            if *restored && actual != baseline {
                return Err(E2eError::CountMismatch {
                    stage: "restore".to_string(),
                    expected: baseline,
                    actual,
                });
            }
        }
    }
    Ok(())
}
