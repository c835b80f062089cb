pub mod correlate;
pub mod error;
pub mod store;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;
pub mod types;

pub use error::CoreError;
pub use store::{LedgerStore, SqliteStore};
pub use types::{Message, MempoolMessage, Record, TxResolution};
