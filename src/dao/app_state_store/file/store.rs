use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use futures::future::BoxFuture;
use tempfile::Builder;
use tokio::{fs, task};
use tracing::debug;

use crate::dao::{app_state_store::AppStateStore, models::AppStateEntity, storage::StorageResult};

use super::error::{FileDaoError, FileResult};

const STATE_FILE_NAME: &str = "app_state.json";
const TEMP_PREFIX: &str = "app_state.";
const TEMP_SUFFIX: &str = ".tmp";

/// Stores the state document as pretty JSON inside a data directory.
///
/// Each write goes to its own temporary file in the same directory, which is
/// synced and then renamed over the live file, so readers only ever observe
/// complete documents. Writes run on the blocking pool and finish even when
/// the caller stops waiting; a write that lands after a newer one is dropped.
#[derive(Clone)]
pub struct FileAppStateStore {
    dir: Arc<PathBuf>,
    path: Arc<PathBuf>,
    next_generation: Arc<AtomicU64>,
    /// Generation of the document currently on disk.
    written: Arc<Mutex<u64>>,
}

impl FileAppStateStore {
    /// Open (creating if needed) the directory holding the state file.
    pub async fn open(dir: impl Into<PathBuf>) -> FileResult<Self> {
        let dir = dir.into();
        ensure_dir(&dir).await?;
        let path = dir.join(STATE_FILE_NAME);
        Ok(Self {
            dir: Arc::new(dir),
            path: Arc::new(path),
            next_generation: Arc::new(AtomicU64::new(0)),
            written: Arc::new(Mutex::new(0)),
        })
    }

    /// Location of the live state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> FileResult<Option<AppStateEntity>> {
        let path = self.path.as_ref();
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(FileDaoError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| FileDaoError::Decode {
                path: path.clone(),
                source,
            })
    }

    async fn write(&self, entity: &AppStateEntity) -> FileResult<()> {
        let payload =
            serde_json::to_vec_pretty(entity).map_err(|source| FileDaoError::Encode { source })?;
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let store = self.clone();

        task::spawn_blocking(move || store.replace_file(generation, &payload))
            .await
            .map_err(|source| FileDaoError::WriterGone { source })?
    }

    fn replace_file(&self, generation: u64, payload: &[u8]) -> FileResult<()> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if generation < *written {
            debug!(generation, current = *written, "dropping superseded state write");
            return Ok(());
        }

        let dir = self.dir.as_ref();
        let write_err = |source| FileDaoError::Write {
            path: dir.clone(),
            source,
        };
        let mut temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(write_err)?;
        temp.write_all(payload).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;

        temp.persist(self.path.as_ref())
            .map_err(|err| FileDaoError::Replace {
                path: self.path.as_ref().clone(),
                source: err.error,
            })?;
        *written = generation;
        Ok(())
    }

    async fn check_writable(&self) -> FileResult<()> {
        let dir = self.dir.as_ref();
        let metadata = fs::metadata(dir)
            .await
            .map_err(|source| FileDaoError::Inaccessible {
                path: dir.clone(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(FileDaoError::Inaccessible {
                path: dir.clone(),
                source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
            });
        }
        if metadata.permissions().readonly() {
            return Err(FileDaoError::ReadOnly { path: dir.clone() });
        }
        Ok(())
    }
}

async fn ensure_dir(dir: &Path) -> FileResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| FileDaoError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}

impl AppStateStore for FileAppStateStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read().await.map_err(Into::into) })
    }

    fn save(&self, state: AppStateEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(&state).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_writable().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { ensure_dir(&store.dir).await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::event::{AppState, ScreenMode};

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAppStateStore::open(dir.path().join("db")).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn saved_state_is_loaded_back_and_temp_file_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAppStateStore::open(dir.path()).await.unwrap();

        let mut state = AppState::with_title("Gala");
        state.winners.insert(1, 5);
        state.active_screen = ScreenMode::Award { award_id: 1 };
        store.save(AppStateEntity::from(&state)).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap().into_state("unused");
        assert_eq!(loaded, state);
        assert_eq!(file_names(dir.path()), vec![STATE_FILE_NAME.to_string()]);
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[tokio::test]
    async fn overlapping_saves_never_mix_and_newest_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAppStateStore::open(dir.path()).await.unwrap();

        let saves = (0..20).map(|index| {
            let mut state = AppState::with_title(format!("save {index}"));
            state.winners.insert(index, index + 100);
            store.save(AppStateEntity::from(&state))
        });
        for result in futures::future::join_all(saves).await {
            result.unwrap();
        }

        let loaded = store.load().await.unwrap().unwrap().into_state("unused");
        assert_eq!(loaded.event_title, "save 19");
        assert_eq!(loaded.winners.len(), 1);
        assert_eq!(file_names(dir.path()), vec![STATE_FILE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn late_write_of_an_older_document_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAppStateStore::open(dir.path()).await.unwrap();
        let encode = |title: &str| {
            serde_json::to_vec(&AppStateEntity::from(&AppState::with_title(title))).unwrap()
        };

        // Generation 2 finishes before generation 1, as after a timed-out save.
        store.replace_file(2, &encode("newer")).unwrap();
        store.replace_file(1, &encode("older")).unwrap();

        let loaded = store.load().await.unwrap().unwrap().into_state("unused");
        assert_eq!(loaded.event_title, "newer");
        assert_eq!(file_names(dir.path()), vec![STATE_FILE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAppStateStore::open(dir.path()).await.unwrap();
        std::fs::write(store.path(), b"{not json").unwrap();

        assert!(store.load().await.is_err());
        assert_eq!(std::fs::read(store.path()).unwrap(), b"{not json");
    }

    #[tokio::test]
    async fn reads_file_written_by_earlier_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAppStateStore::open(dir.path()).await.unwrap();
        std::fs::write(
            store.path(),
            br#"{"predictions_locked":false,"current_award_id":null,"winners":{"2":9}}"#,
        )
        .unwrap();

        let state = store.load().await.unwrap().unwrap().into_state("Gala");
        assert_eq!(state.winner_for(2), Some(9));
        assert_eq!(state.active_screen, ScreenMode::Logo);
    }
}
