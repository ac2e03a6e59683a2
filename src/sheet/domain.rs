//! Core sheet domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{auth::UserID, database_id::SheetId, title::Title};

/// A budget period, e.g. "March 2025", that transactions are recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub id: SheetId,
    /// The user that owns the sheet.
    pub user_id: UserID,
    pub title: Title,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The money that moved through a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetTotals {
    /// The sum of the nominal amounts of the sheet's `in` transactions.
    pub total_in: i64,
    /// The sum of the nominal amounts of the sheet's `out` transactions.
    pub total_out: i64,
}

impl SheetTotals {
    /// What is left over after expenses, may be negative.
    pub fn net(&self) -> i64 {
        self.total_in - self.total_out
    }
}

/// A sheet together with its totals, used for the list of sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub sheet: Sheet,
    pub totals: SheetTotals,
}

/// Form data for sheet creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct SheetFormData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
