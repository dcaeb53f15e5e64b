mod batch;
mod error;
mod file_store;
mod layout;
mod range;
mod reconcile;
mod store;

pub use batch::{sync_accounts, AccountOutcome, BatchReport, SyncOutcome};
pub use error::{LayoutError, RangeParseError, Stage, StoreError, SyncError};
pub use file_store::JsonFileStore;
pub use layout::{IdentityMatch, PlayerIdentity, SheetLayout, IDENTITY_COLUMNS};
pub use range::{column_index, column_letter, CellRef, SheetRange};
pub use reconcile::{CellFailure, Reconciler, Reconciliation};
pub use store::{MemoryStore, TableStore};
