//! Infrastructure layer: row storage, snapshot files, dashboard composition.

pub mod dashboard;
pub mod snapshot_file;
pub mod store;

pub use dashboard::{Dashboard, build_dashboard};
pub use snapshot_file::{SnapshotFileError, load_snapshot, parse_snapshot};
pub use store::{ExpenseDraft, InMemoryLedgerStore, LedgerStore, PaymentDraft, StoreError};
