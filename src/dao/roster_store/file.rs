use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde::{Deserialize, de::DeserializeOwned};
use tokio::fs;

use crate::dao::{
    app_state_store::file::FileDaoError,
    models::{AwardEntity, GuestEntity, RoomEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

#[derive(Debug, Default, Deserialize)]
struct AwardsFile {
    #[serde(default)]
    awards: Vec<AwardEntity>,
}

#[derive(Debug, Default, Deserialize)]
struct GuestsFile {
    #[serde(default)]
    guests: Vec<GuestEntity>,
}

#[derive(Debug, Default, Deserialize)]
struct RoomsFile {
    #[serde(default)]
    rooms: Vec<RoomEntity>,
}

/// Reads `awards.json` from the data directory and `guests.json`/`rooms.json`
/// from its `db` subdirectory. Files are re-read on every call so edits made by
/// the setup tooling show up immediately.
#[derive(Clone)]
pub struct FileRosterStore {
    data_dir: Arc<PathBuf>,
}

impl FileRosterStore {
    /// Roster read from `awards.json` and `db/` under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Arc::new(data_dir.into()),
        }
    }

    fn awards_path(&self) -> PathBuf {
        self.data_dir.join("awards.json")
    }

    fn guests_path(&self) -> PathBuf {
        self.data_dir.join("db").join("guests.json")
    }

    fn rooms_path(&self) -> PathBuf {
        self.data_dir.join("db").join("rooms.json")
    }
}

/// A missing file reads as an empty document.
async fn read_json<T>(path: &Path) -> Result<T, FileDaoError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(FileDaoError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| FileDaoError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

impl RosterStore for FileRosterStore {
    fn list_awards(&self) -> BoxFuture<'static, StorageResult<Vec<AwardEntity>>> {
        let path = self.awards_path();
        Box::pin(async move {
            let file: AwardsFile = read_json(&path).await?;
            Ok(file.awards)
        })
    }

    fn list_guests(&self) -> BoxFuture<'static, StorageResult<Vec<GuestEntity>>> {
        let path = self.guests_path();
        Box::pin(async move {
            let file: GuestsFile = read_json(&path).await?;
            Ok(file.guests)
        })
    }

    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let path = self.rooms_path();
        Box::pin(async move {
            let file: RoomsFile = read_json(&path).await?;
            Ok(file.rooms)
        })
    }
}
