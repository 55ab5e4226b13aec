mod error;
mod store;

pub use error::FileDaoError;
pub use store::FileAppStateStore;

use crate::dao::storage::StorageError;

impl From<FileDaoError> for StorageError {
    fn from(err: FileDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
