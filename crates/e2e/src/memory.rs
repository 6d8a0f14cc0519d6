//! In-memory reference grid
//!
//! Behaves the way the admin panel grids do: filters combine, sorting is
//! stable, pagination starts at page 1 after every reload, and bulk
//! actions touch the rows on the current page. Faults can be switched on
//! to reproduce the defect classes the verifiers exist to catch.

use gridcheck_common::pagination::total_pages;
use gridcheck_common::{
    compare_cells, parse_flag, flag_value, FilterPredicate, FilterType, GridSchema, Row, SortDirection,
    SortInstruction,
};
use std::cmp::Ordering;
use tracing::debug;

use crate::context::StatusMessages;
use crate::driver::{DriverFactory, GridDriver};
use crate::error::{E2eError, E2eResult};
use crate::spec::GridSuite;

pub const DEFAULT_PAGE_SIZE: usize = 50;

const CREATED: &str = "Successful creation";
const UPDATED: &str = "Successful update";
const DELETED: &str = "Successful deletion";
const BULK_DELETED: &str = "The selection has been successfully deleted.";
const STATUS_UPDATED: &str = "The status has been successfully updated.";

/// Defects the grid can be told to exhibit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryFaults {
    /// Reset leaves filters in place
    pub leak_filters: bool,
    /// Sort requests are acknowledged but ignored
    pub ignore_sort: bool,
    /// Creations report success without adding a row
    pub drop_creations: bool,
    /// Next/previous report success without moving
    pub sticky_pagination: bool,
    /// Filters return every row
    pub ignore_filters: bool,
}

pub struct MemoryGrid {
    schema: GridSchema,
    messages: StatusMessages,
    rows: Vec<Row>,
    next_id: u64,
    filters: Vec<FilterPredicate>,
    sort: Option<SortInstruction>,
    page_size: usize,
    page: usize,
    faults: MemoryFaults,
}

impl MemoryGrid {
    pub fn new(schema: GridSchema) -> Self {
        Self {
            schema,
            messages: StatusMessages::default(),
            rows: Vec::new(),
            next_id: 1,
            filters: Vec::new(),
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            faults: MemoryFaults::default(),
        }
    }

    /// Grid seeded from a suite's schema, messages and seed rows
    pub fn from_suite(suite: &GridSuite) -> Self {
        let mut grid = Self::new(suite.grid.clone()).with_messages(suite.messages.clone());
        for row in &suite.seed {
            grid.insert(row.clone());
        }
        grid
    }

    pub fn with_messages(mut self, messages: StatusMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_faults(mut self, faults: MemoryFaults) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        for row in rows {
            self.insert(row);
        }
        self
    }

    pub fn set_faults(&mut self, faults: MemoryFaults) {
        self.faults = faults;
    }

    /// Every stored row, unfiltered
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Store a row, assigning a key when it has none
    pub fn insert(&mut self, mut row: Row) -> String {
        let key_column = self.schema.key_column.clone();
        let key = match row.get(&key_column).map(str::to_string) {
            Some(key) => {
                if let Ok(n) = key.parse::<u64>() {
                    self.next_id = self.next_id.max(n + 1);
                }
                key
            }
            None => {
                let key = self.next_id.to_string();
                self.next_id += 1;
                row.set(key_column, key.clone());
                key
            }
        };
        self.rows.push(row);
        key
    }

    fn compare_rows(&self, a: &Row, b: &Row, sort: &SortInstruction) -> Ordering {
        let left = a.get(&sort.column).unwrap_or_default();
        let right = b.get(&sort.column).unwrap_or_default();
        let ordering = match self.schema.column(&sort.column) {
            Ok(meta) => compare_cells(meta, left, right).unwrap_or_else(|_| left.cmp(right)),
            Err(_) => left.cmp(right),
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    fn row_matches(&self, row: &Row, predicate: &FilterPredicate) -> bool {
        predicate.matches(row.get(&predicate.column).unwrap_or_default())
    }

    /// Filtered and sorted rows, across all pages
    fn view(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = if self.faults.ignore_filters {
            self.rows.iter().collect()
        } else {
            self.rows
                .iter()
                .filter(|r| self.filters.iter().all(|p| self.row_matches(r, p)))
                .collect()
        };
        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| self.compare_rows(a, b, sort));
        }
        rows
    }

    fn total_pages(&self) -> usize {
        total_pages(self.view().len(), self.page_size)
    }

    fn page_rows(&self) -> Vec<&Row> {
        let start = (self.page - 1) * self.page_size;
        self.view().into_iter().skip(start).take(self.page_size).collect()
    }

    fn page_keys(&self) -> Vec<String> {
        let key_column = &self.schema.key_column;
        self.page_rows()
            .iter()
            .filter_map(|r| r.get(key_column).map(str::to_string))
            .collect()
    }

    fn key_at(&self, row: usize) -> E2eResult<String> {
        let keys = self.page_keys();
        row.checked_sub(1)
            .and_then(|i| keys.get(i).cloned())
            .ok_or_else(|| E2eError::Driver(format!("row {} is not on the current page ({} rows)", row, keys.len())))
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key_column = &self.schema.key_column;
        self.rows.iter().position(|r| r.get(key_column) == Some(key))
    }

    fn indicator(&self) -> String {
        format!("(page {} / {})", self.page, self.total_pages())
    }

    fn status_column(&self) -> E2eResult<String> {
        self.schema.status_column.clone().ok_or(E2eError::NoStatusColumn)
    }

    fn reload(&mut self) {
        self.page = 1;
    }

    fn message<'a>(configured: &'a Option<String>, fallback: &'a str) -> String {
        configured.as_deref().unwrap_or(fallback).to_string()
    }
}

#[async_trait::async_trait]
impl GridDriver for MemoryGrid {
    fn name(&self) -> &str {
        &self.schema.name
    }

    async fn reset_and_get_number_of_lines(&mut self) -> E2eResult<usize> {
        if !self.faults.leak_filters {
            self.filters.clear();
        }
        self.sort = None;
        self.reload();
        Ok(self.view().len())
    }

    async fn filter_table(&mut self, filter_type: FilterType, column: &str, value: &str) -> E2eResult<()> {
        let meta = self.schema.column(column)?;
        let predicate = FilterPredicate {
            filter_type,
            ..FilterPredicate::for_column(meta, value)
        };
        debug!("[{}] filter {}", self.schema.name, predicate);
        self.filters.retain(|p| p.column != column);
        self.filters.push(predicate);
        self.reload();
        Ok(())
    }

    async fn get_text_column(&mut self, row: usize, column: &str) -> E2eResult<String> {
        let key = self.key_at(row)?;
        let index = self.position(&key).ok_or_else(|| E2eError::Driver(format!("row {} vanished", key)))?;
        Ok(self.rows[index].get(column).unwrap_or_default().to_string())
    }

    async fn get_status(&mut self, row: usize) -> E2eResult<bool> {
        let column = self.status_column()?;
        let cell = self.get_text_column(row, &column).await?;
        parse_flag(&cell).ok_or_else(|| E2eError::Driver(format!("row {} status reads '{}'", row, cell)))
    }

    async fn get_number_of_element_in_grid(&mut self) -> E2eResult<usize> {
        Ok(self.view().len())
    }

    async fn sort_table(&mut self, column: &str, direction: SortDirection) -> E2eResult<()> {
        self.schema.column(column)?;
        if !self.faults.ignore_sort {
            self.sort = Some(SortInstruction::new(column, direction));
        }
        self.reload();
        Ok(())
    }

    async fn get_all_rows_column_content(&mut self, column: &str) -> E2eResult<Vec<String>> {
        self.schema.column(column)?;
        Ok(self
            .page_rows()
            .iter()
            .map(|r| r.get(column).unwrap_or_default().to_string())
            .collect())
    }

    async fn select_pagination_limit(&mut self, size: usize) -> E2eResult<String> {
        if size == 0 {
            return Err(E2eError::Driver("page size must be positive".to_string()));
        }
        self.page_size = size;
        self.reload();
        Ok(self.indicator())
    }

    async fn pagination_next(&mut self) -> E2eResult<String> {
        if !self.faults.sticky_pagination {
            self.page = (self.page + 1).min(self.total_pages());
        }
        Ok(self.indicator())
    }

    async fn pagination_previous(&mut self) -> E2eResult<String> {
        if !self.faults.sticky_pagination {
            self.page = self.page.saturating_sub(1).max(1);
        }
        Ok(self.indicator())
    }

    async fn bulk_set_status(&mut self, enabled: bool) -> E2eResult<String> {
        let column = self.status_column()?;
        for key in self.page_keys() {
            if let Some(i) = self.position(&key) {
                self.rows[i].set(column.clone(), flag_value(enabled));
            }
        }
        Ok(Self::message(&self.messages.status_updated, STATUS_UPDATED))
    }

    async fn delete_with_bulk_actions(&mut self) -> E2eResult<String> {
        let keys = self.page_keys();
        let key_column = self.schema.key_column.clone();
        self.rows
            .retain(|r| !r.get(&key_column).map(|k| keys.iter().any(|d| d == k)).unwrap_or(false));
        self.reload();
        Ok(Self::message(&self.messages.bulk_deleted, BULK_DELETED))
    }

    async fn create_row(&mut self, draft: &Row) -> E2eResult<String> {
        if !self.faults.drop_creations {
            let mut row = draft.clone();
            // The key is always server-assigned
            row.0.remove(&self.schema.key_column);
            let key = self.insert(row);
            debug!("[{}] created row {}", self.schema.name, key);
        }
        self.reload();
        Ok(Self::message(&self.messages.created, CREATED))
    }

    async fn update_row(&mut self, row: usize, draft: &Row) -> E2eResult<String> {
        let key = self.key_at(row)?;
        let key_column = self.schema.key_column.clone();
        if let Some(i) = self.position(&key) {
            for (column, value) in draft.columns() {
                if column != key_column {
                    self.rows[i].set(column, value);
                }
            }
        }
        self.reload();
        Ok(Self::message(&self.messages.updated, UPDATED))
    }

    async fn delete_row(&mut self, row: usize) -> E2eResult<String> {
        let key = self.key_at(row)?;
        if let Some(i) = self.position(&key) {
            self.rows.remove(i);
        }
        self.reload();
        Ok(Self::message(&self.messages.deleted, DELETED))
    }
}

/// Opens a seeded `MemoryGrid` per suite
#[derive(Debug, Clone, Default)]
pub struct MemoryDriverFactory {
    pub faults: MemoryFaults,
}

#[async_trait::async_trait]
impl DriverFactory for MemoryDriverFactory {
    async fn open(&self, suite: &GridSuite) -> E2eResult<Box<dyn GridDriver>> {
        Ok(Box::new(MemoryGrid::from_suite(suite).with_faults(self.faults)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcheck_common::{ColumnKind, ColumnMeta};

    fn grid() -> MemoryGrid {
        let schema = GridSchema::new(
            "currency",
            "id_currency",
            vec![
                ColumnMeta::new("id_currency", ColumnKind::Id),
                ColumnMeta::new("iso_code", ColumnKind::Text),
                ColumnMeta::new("active", ColumnKind::Boolean),
            ],
        )
        .with_status_column("active");
        MemoryGrid::new(schema).with_rows(vec![
            Row::new().with("id_currency", "13").with("iso_code", "EUR").with("active", "1"),
            Row::new().with("id_currency", "3").with("iso_code", "USD").with("active", "0"),
            Row::new().with("id_currency", "7").with("iso_code", "MAD").with("active", "1"),
        ])
    }

    #[tokio::test]
    async fn test_numeric_sort_and_reset() {
        let mut grid = grid();
        grid.sort_table("id_currency", SortDirection::Asc).await.unwrap();
        assert_eq!(
            grid.get_all_rows_column_content("id_currency").await.unwrap(),
            vec!["3", "7", "13"]
        );
        assert_eq!(grid.reset_and_get_number_of_lines().await.unwrap(), 3);
        assert_eq!(
            grid.get_all_rows_column_content("id_currency").await.unwrap(),
            vec!["13", "3", "7"]
        );
    }

    #[tokio::test]
    async fn test_keys_assigned_after_highest() {
        let mut grid = grid();
        grid.create_row(&Row::new().with("iso_code", "TND")).await.unwrap();
        let last = grid.rows().last().unwrap();
        assert_eq!(last.get("id_currency"), Some("14"));
    }

    #[tokio::test]
    async fn test_status_filter_and_bulk() {
        let mut grid = grid();
        grid.filter_table(FilterType::Select, "active", "1").await.unwrap();
        assert_eq!(grid.get_number_of_element_in_grid().await.unwrap(), 2);

        grid.bulk_set_status(false).await.unwrap();
        // Disabled rows no longer match the active filter
        assert_eq!(grid.get_number_of_element_in_grid().await.unwrap(), 0);

        grid.reset_and_get_number_of_lines().await.unwrap();
        grid.filter_table(FilterType::Select, "active", "0").await.unwrap();
        assert_eq!(grid.get_number_of_element_in_grid().await.unwrap(), 3);
        assert!(!grid.get_status(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_pagination_clamps() {
        let mut grid = grid();
        assert_eq!(grid.select_pagination_limit(2).await.unwrap(), "(page 1 / 2)");
        assert_eq!(grid.pagination_next().await.unwrap(), "(page 2 / 2)");
        assert_eq!(grid.pagination_next().await.unwrap(), "(page 2 / 2)");
        assert_eq!(grid.get_all_rows_column_content("iso_code").await.unwrap(), vec!["MAD"]);
        assert_eq!(grid.pagination_previous().await.unwrap(), "(page 1 / 2)");
        assert_eq!(grid.pagination_previous().await.unwrap(), "(page 1 / 2)");
    }

    #[tokio::test]
    async fn test_row_out_of_range() {
        let mut grid = grid();
        assert!(matches!(grid.get_text_column(4, "iso_code").await, Err(E2eError::Driver(_))));
        assert!(matches!(grid.get_text_column(0, "iso_code").await, Err(E2eError::Driver(_))));
    }

    #[tokio::test]
    async fn test_leaking_filters_survive_reset() {
        let mut grid = grid().with_faults(MemoryFaults {
            leak_filters: true,
            ..Default::default()
        });
        grid.filter_table(FilterType::Input, "iso_code", "EUR").await.unwrap();
        assert_eq!(grid.reset_and_get_number_of_lines().await.unwrap(), 1);
    }
}
