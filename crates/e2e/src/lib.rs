//! GridCheck grid verification
//!
//! Rust-controlled checks for admin-panel data grids:
//! - Records a baseline row count and tracks it through every mutation
//! - Verifies filters, sort order and pagination against computed expectations
//! - Drives a real grid through a Playwright bridge, or an in-memory grid
//! - Runs declarative YAML suites and writes a JSON report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   GridRunner (Rust)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  per suite:                                                 │
//! │    DriverFactory::open(suite) -> Box<dyn GridDriver>        │
//! │    GridContext { schema, messages, expected, pagination }   │
//! │    for step in suite.steps: execute_step(driver, ctx, step) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Verifiers                                                  │
//! │    baseline    reset and record Expected Count              │
//! │    mutation    create / update / delete, count +1 / 0 / -1  │
//! │    filter      bound, content, clear and recheck            │
//! │    sort        column order vs. expected_order()            │
//! │    pagination  "(page P / N)" vs. PaginationModel           │
//! │    bulk        status toggle and bulk delete                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Drivers                                                    │
//! │    PlaywrightGrid  node bridge, line-delimited JSON         │
//! │    MemoryGrid      reference grid with fault injection      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod baseline;
pub mod bulk;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod filter;
pub mod memory;
pub mod mutation;
pub mod pagination;
pub mod playwright;
pub mod probe;
pub mod runner;
pub mod sort;
pub mod spec;

pub use config::HarnessConfig;
pub use context::{GridContext, StatusMessages};
pub use driver::{DriverFactory, GridDriver};
pub use error::{E2eError, E2eResult, FailureCategory};
pub use memory::{MemoryDriverFactory, MemoryFaults, MemoryGrid};
pub use playwright::{PlaywrightConfig, PlaywrightFactory};
pub use runner::{GridRunner, RunResult, RunnerConfig, SuiteResult};
pub use spec::{GridSuite, SuiteStep};
