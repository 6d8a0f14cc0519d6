//! Core grid types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Rows and snapshots
// ============================================================================

/// One grid entry, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub BTreeMap<String, String>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Value of the schema's key column
    pub fn key<'a>(&'a self, schema: &GridSchema) -> Option<&'a str> {
        self.get(&schema.key_column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Rows as currently displayed, bounded by the page size
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: Vec<Row>,
}

impl GridSnapshot {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Content of one column, top to bottom. Missing cells read as empty.
    pub fn column(&self, column: &str) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.get(column).unwrap_or_default().to_string())
            .collect()
    }
}

// ============================================================================
// Column metadata
// ============================================================================

/// Explicit type tag for a grid column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Numeric,
    Id,
    Boolean,
    Enum,
}

impl ColumnKind {
    /// Whether sorting compares parsed numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric | ColumnKind::Id)
    }

    /// Match mode a filter on this column uses
    pub fn filter_operator(&self) -> FilterOperator {
        match self {
            ColumnKind::Text => FilterOperator::Contains,
            _ => FilterOperator::Equals,
        }
    }

    /// Widget the admin panel renders for filtering this column
    pub fn default_filter_type(&self) -> FilterType {
        match self {
            ColumnKind::Boolean | ColumnKind::Enum => FilterType::Select,
            _ => FilterType::Input,
        }
    }
}

/// How text cells compare when sorted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCollation {
    #[default]
    Binary,
    CaseInsensitive,
}

/// Filter widget kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Input,
    Select,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Input => "input",
            FilterType::Select => "select",
        }
    }
}

/// Metadata for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column identifier as the grid names it (e.g. `id_supplier`)
    pub name: String,

    #[serde(default)]
    pub kind: ColumnKind,

    #[serde(default = "default_true")]
    pub sortable: bool,

    #[serde(default = "default_true")]
    pub filterable: bool,

    /// Overrides the widget derived from `kind`
    #[serde(default)]
    pub filter_type: Option<FilterType>,

    #[serde(default)]
    pub collation: TextCollation,
}

fn default_true() -> bool {
    true
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            sortable: true,
            filterable: true,
            filter_type: None,
            collation: TextCollation::Binary,
        }
    }

    pub fn with_collation(mut self, collation: TextCollation) -> Self {
        self.collation = collation;
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type.unwrap_or_else(|| self.kind.default_filter_type())
    }
}

/// Column-metadata table for one grid, resolved once per suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSchema {
    /// Grid name (e.g. `supplier`)
    pub name: String,

    /// Unique key column
    pub key_column: String,

    /// Boolean column read through the status accessor, if any
    #[serde(default)]
    pub status_column: Option<String>,

    pub columns: Vec<ColumnMeta>,
}

impl GridSchema {
    pub fn new(name: impl Into<String>, key_column: impl Into<String>, columns: Vec<ColumnMeta>) -> Self {
        Self {
            name: name.into(),
            key_column: key_column.into(),
            status_column: None,
            columns,
        }
    }

    pub fn with_status_column(mut self, column: impl Into<String>) -> Self {
        self.status_column = Some(column.into());
        self
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn {
                grid: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Check the table is self-consistent
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::InvalidSchema(format!("grid '{}' has no columns", self.name)));
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::InvalidSchema(format!("duplicate column '{}'", col.name)));
            }
        }
        self.column(&self.key_column)?;
        if let Some(status) = &self.status_column {
            let meta = self.column(status)?;
            if meta.kind != ColumnKind::Boolean {
                return Err(Error::InvalidSchema(format!(
                    "status column '{}' must be boolean",
                    status
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Filter predicates
// ============================================================================

/// How a filter value matches a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Case-insensitive substring, like the SQL `LIKE '%v%'` the grids issue
    Contains,
    Equals,
}

/// (column, operator, value) triple narrowing a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub column: String,
    pub filter_type: FilterType,
    pub kind: ColumnKind,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterPredicate {
    /// Build a predicate whose operator follows the column's type tag
    pub fn for_column(meta: &ColumnMeta, value: impl Into<String>) -> Self {
        Self {
            column: meta.name.clone(),
            filter_type: meta.filter_type(),
            kind: meta.kind,
            operator: meta.kind.filter_operator(),
            value: value.into(),
        }
    }

    /// Whether a cell satisfies this predicate
    pub fn matches(&self, cell: &str) -> bool {
        let cell = cell.trim();
        let value = self.value.trim();
        match self.operator {
            FilterOperator::Contains => cell.to_lowercase().contains(&value.to_lowercase()),
            FilterOperator::Equals => match self.kind {
                ColumnKind::Boolean => match (parse_flag(cell), parse_flag(value)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
                ColumnKind::Numeric | ColumnKind::Id => {
                    match (cell.parse::<f64>(), value.parse::<f64>()) {
                        (Ok(a), Ok(b)) => a == b,
                        _ => cell == value,
                    }
                }
                _ => cell == value,
            },
        }
    }

    /// Whether a status flag satisfies this predicate (boolean columns)
    pub fn matches_flag(&self, flag: bool) -> bool {
        parse_flag(&self.value) == Some(flag)
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operator {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "=",
        };
        write!(f, "{} {} '{}'", self.column, op, self.value)
    }
}

/// Read the admin panel's various spellings of a boolean
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "enabled" | "on" | "check" => Some(true),
        "0" | "false" | "no" | "disabled" | "off" | "clear" => Some(false),
        _ => None,
    }
}

/// Render a flag the way select filters expect it
pub fn flag_value(flag: bool) -> &'static str {
    if flag {
        "1"
    } else {
        "0"
    }
}

// ============================================================================
// Sorting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (column, direction) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortInstruction {
    pub column: String,
    pub direction: SortDirection,
}

impl SortInstruction {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

impl fmt::Display for SortInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}
