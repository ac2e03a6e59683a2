//! Sheets are budget periods, e.g. "Maret 2025", that transactions are recorded in.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod view;

pub use create::{create_sheet_endpoint, get_new_sheet_page};
pub use db::{
    create_sheet, create_sheet_table, delete_sheet, get_sheet, get_sheet_summaries,
    get_sheet_totals, update_sheet,
};
pub use delete::delete_sheet_endpoint;
pub use domain::{Sheet, SheetFormData, SheetSummary, SheetTotals};
pub use edit::{get_edit_sheet_page, update_sheet_endpoint};
pub use list::get_sheets_page;
pub use view::get_sheet_page;
