//! Per-suite verification state
//!
//! One `GridContext` is created per suite and passed by `&mut` through every
//! step, carrying the column table and the Expected Count.

use gridcheck_common::{ColumnMeta, ExpectedCount, GridSchema, PaginationModel};
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// Alert texts the admin panel shows after each mutation.
///
/// Unset messages are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMessages {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub deleted: Option<String>,
    #[serde(default)]
    pub bulk_deleted: Option<String>,
    #[serde(default)]
    pub status_updated: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GridContext {
    pub schema: GridSchema,
    pub messages: StatusMessages,
    /// Indicator model, set once a page size has been selected
    pub pagination: Option<PaginationModel>,
    expected: Option<ExpectedCount>,
}

impl GridContext {
    pub fn new(schema: GridSchema, messages: StatusMessages) -> E2eResult<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            messages,
            pagination: None,
            expected: None,
        })
    }

    pub fn column(&self, name: &str) -> E2eResult<&ColumnMeta> {
        Ok(self.schema.column(name)?)
    }

    pub fn set_baseline(&mut self, count: usize) {
        self.expected = Some(ExpectedCount::from_baseline(count));
    }

    pub fn has_baseline(&self) -> bool {
        self.expected.is_some()
    }

    pub fn expected(&self) -> E2eResult<&ExpectedCount> {
        self.expected.as_ref().ok_or(E2eError::NoBaseline)
    }

    pub fn expected_mut(&mut self) -> E2eResult<&mut ExpectedCount> {
        self.expected.as_mut().ok_or(E2eError::NoBaseline)
    }

    /// Current Expected Count
    pub fn count(&self) -> E2eResult<usize> {
        Ok(self.expected()?.current())
    }

    /// The grid was reloaded (filter, sort or mutation): back to page 1,
    /// with the page size kept and totals following Expected Count.
    pub fn grid_reloaded(&mut self) {
        let count = self.expected.map(|e| e.current());
        if let (Some(model), Some(count)) = (self.pagination.as_mut(), count) {
            model.reload(count);
        }
    }
}

/// Compare an alert text with its configured expectation
pub fn check_message(action: &str, expected: Option<&str>, actual: &str) -> E2eResult<()> {
    match expected {
        Some(want) if want.trim() != actual.trim() => Err(E2eError::UnexpectedMessage {
            action: action.to_string(),
            expected: want.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcheck_common::ColumnKind;

    fn context() -> GridContext {
        let schema = GridSchema::new(
            "contact",
            "id_contact",
            vec![
                ColumnMeta::new("id_contact", ColumnKind::Id),
                ColumnMeta::new("email", ColumnKind::Text),
            ],
        );
        GridContext::new(schema, StatusMessages::default()).unwrap()
    }

    #[test]
    fn test_count_requires_baseline() {
        let mut ctx = context();
        assert!(matches!(ctx.count(), Err(E2eError::NoBaseline)));
        ctx.set_baseline(2);
        assert_eq!(ctx.count().unwrap(), 2);
    }

    #[test]
    fn test_check_message() {
        assert!(check_message("create", None, "anything").is_ok());
        assert!(check_message("create", Some("Successful creation"), "Successful creation\n").is_ok());
        assert!(matches!(
            check_message("create", Some("Successful creation"), "Error"),
            Err(E2eError::UnexpectedMessage { .. })
        ));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let schema = GridSchema::new("contact", "missing", vec![ColumnMeta::new("email", ColumnKind::Text)]);
        assert!(matches!(
            GridContext::new(schema, StatusMessages::default()),
            Err(E2eError::Model(_))
        ));
    }
}
