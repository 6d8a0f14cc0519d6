//! Driver contract the verifiers run against
//!
//! A driver wraps whatever actually manipulates the grid: a browser page
//! through Playwright, or the in-memory reference grid. Rows are 1-based,
//! counted from the top of the current page.

use gridcheck_common::{FilterType, Row, SortDirection};

use crate::error::E2eResult;
use crate::spec::GridSuite;

#[async_trait::async_trait]
pub trait GridDriver: Send {
    /// Short label for logs
    fn name(&self) -> &str;

    /// Clear every filter and sort, then count the rows
    async fn reset_and_get_number_of_lines(&mut self) -> E2eResult<usize>;

    /// Fill a column filter and submit it
    async fn filter_table(&mut self, filter_type: FilterType, column: &str, value: &str) -> E2eResult<()>;

    /// Text of one cell
    async fn get_text_column(&mut self, row: usize, column: &str) -> E2eResult<String>;

    /// Status toggle of one row
    async fn get_status(&mut self, row: usize) -> E2eResult<bool>;

    /// Row count the grid header reports for the current filter
    async fn get_number_of_element_in_grid(&mut self) -> E2eResult<usize>;

    async fn sort_table(&mut self, column: &str, direction: SortDirection) -> E2eResult<()>;

    /// Every visible cell of one column, top to bottom
    async fn get_all_rows_column_content(&mut self, column: &str) -> E2eResult<Vec<String>>;

    /// Change the page size; returns the pagination indicator text
    async fn select_pagination_limit(&mut self, size: usize) -> E2eResult<String>;

    async fn pagination_next(&mut self) -> E2eResult<String>;

    async fn pagination_previous(&mut self) -> E2eResult<String>;

    /// Select all visible rows and set their status; returns the alert text
    async fn bulk_set_status(&mut self, enabled: bool) -> E2eResult<String>;

    /// Select all visible rows and delete them; returns the alert text
    async fn delete_with_bulk_actions(&mut self) -> E2eResult<String>;

    /// Submit the creation form; returns the alert text
    async fn create_row(&mut self, draft: &Row) -> E2eResult<String>;

    /// Submit the edit form of a visible row; returns the alert text
    async fn update_row(&mut self, row: usize, draft: &Row) -> E2eResult<String>;

    /// Delete one visible row; returns the alert text
    async fn delete_row(&mut self, row: usize) -> E2eResult<String>;

    /// Release browser resources
    async fn close(&mut self) -> E2eResult<()> {
        Ok(())
    }
}

/// Opens one isolated driver session per suite
#[async_trait::async_trait]
pub trait DriverFactory: Send + Sync {
    async fn open(&self, suite: &GridSuite) -> E2eResult<Box<dyn GridDriver>>;
}
