//! Declarative YAML grid suites

use gridcheck_common::{GridSchema, Row, SortDirection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::context::StatusMessages;
use crate::error::{E2eError, E2eResult};
use crate::pagination::PaginationStep;
use crate::playwright::GridLocators;

/// A complete grid suite parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSuite {
    /// Unique name for this suite
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering suites
    #[serde(default)]
    pub tags: Vec<String>,

    /// Column-metadata table of the grid under test
    pub grid: GridSchema,

    /// Expected alert texts
    #[serde(default)]
    pub messages: StatusMessages,

    /// Selectors for the Playwright driver
    #[serde(default)]
    pub locators: Option<GridLocators>,

    /// Rows the in-memory grid starts with (dry runs only)
    #[serde(default)]
    pub seed: Vec<Row>,

    /// Steps to execute in order
    pub steps: Vec<SuiteStep>,
}

/// Column and value of a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: String,
    pub value: String,
}

/// `count` rows whose values may contain `{i}`, the 0-based row index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTemplate {
    pub count: usize,
    pub values: Row,
}

impl RowTemplate {
    pub fn expand(&self) -> Vec<Row> {
        (0..self.count)
            .map(|i| {
                self.values
                    .columns()
                    .map(|(column, value)| (column.to_string(), value.replace("{i}", &i.to_string())))
                    .collect()
            })
            .collect()
    }
}

/// A single step in a suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SuiteStep {
    /// Reset the grid and record Expected Count
    Baseline {
        /// Fail unless at least this many rows exist
        #[serde(default)]
        min: Option<usize>,
    },

    /// Create rows, checking the count after each
    Create {
        #[serde(default)]
        rows: Vec<Row>,
        #[serde(default)]
        template: Option<RowTemplate>,
    },

    /// Edit a row, optionally located through a filter first
    Update {
        #[serde(default)]
        filter: Option<FilterSpec>,
        #[serde(default = "first_row")]
        row: usize,
        values: Row,
    },

    /// Filter to a single row and delete it
    Delete { filter: FilterSpec },

    /// Filter, check bound and content, then clear
    Filter {
        column: String,
        value: String,
        #[serde(default = "default_true")]
        require_rows: bool,
    },

    /// Sort and compare with the computed order
    Sort {
        column: String,
        direction: SortDirection,
        #[serde(default)]
        idempotent: bool,
    },

    /// Change the page size
    Limit { size: usize },

    Next,

    Previous,

    /// A sequence of limit/next/previous moves
    Paginate { walk: Vec<PaginationStep> },

    /// Set the status of the visible rows
    BulkStatus {
        /// Applied and left active before the bulk action
        #[serde(default)]
        filter: Option<FilterSpec>,
        enabled: bool,
        #[serde(default)]
        max_rows: Option<usize>,
    },

    /// Delete the visible rows
    BulkDelete {
        #[serde(default)]
        filter: Option<FilterSpec>,
        #[serde(default)]
        count: Option<usize>,
    },

    /// Clear filters and check the count
    Reset {
        /// Also require Expected Count to be back at the baseline
        #[serde(default)]
        restored: bool,
    },
}

fn first_row() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl SuiteStep {
    /// Short name for logs and reports
    pub fn label(&self) -> String {
        match self {
            SuiteStep::Baseline { .. } => "baseline".to_string(),
            SuiteStep::Create { rows, template } => {
                let n = rows.len() + template.as_ref().map(|t| t.count).unwrap_or(0);
                format!("create:{}", n)
            }
            SuiteStep::Update { row, .. } => format!("update:row{}", row),
            SuiteStep::Delete { filter } => format!("delete:{}={}", filter.column, filter.value),
            SuiteStep::Filter { column, value, .. } => format!("filter:{}={}", column, value),
            SuiteStep::Sort { column, direction, .. } => format!("sort:{}:{}", column, direction),
            SuiteStep::Limit { size } => format!("limit:{}", size),
            SuiteStep::Next => "next".to_string(),
            SuiteStep::Previous => "previous".to_string(),
            SuiteStep::Paginate { walk } => format!("paginate:{}", walk.len()),
            SuiteStep::BulkStatus { enabled, .. } => {
                format!("bulk_status:{}", if *enabled { "enable" } else { "disable" })
            }
            SuiteStep::BulkDelete { .. } => "bulk_delete".to_string(),
            SuiteStep::Reset { .. } => "reset".to_string(),
        }
    }

    /// Whether this step leaves the grid on page 1 afterwards
    pub fn reloads_grid(&self) -> bool {
        !matches!(
            self,
            SuiteStep::Limit { .. } | SuiteStep::Next | SuiteStep::Previous | SuiteStep::Paginate { .. }
        )
    }
}

impl GridSuite {
    /// Parse a suite from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a suite from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SuiteParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all suites from a directory
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut suites = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            suites.push(Self::from_file(entry.path())?);
        }

        Ok(suites)
    }

    /// Filter suites by tag
    pub fn filter_by_tag<'a>(suites: &'a [Self], tag: &str) -> Vec<&'a Self> {
        suites.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}
