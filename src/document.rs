use crate::codec::{decode_key, parse_civil_datetime};
use crate::errors::{AppError, AppResult};
use crate::models::{Document, Measurement, UserAccount};
use crate::store::RecordMapping;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Injectable medium behind the document store: one opaque text blob,
/// read and replaced whole.
pub trait StorageBacking: Send + Sync {
    /// Returns `None` when no document has been written yet.
    fn read(&self) -> AppResult<Option<String>>;
    fn write(&self, contents: &str) -> AppResult<()>;
}

#[derive(Debug)]
pub struct FileBacking {
    path: PathBuf,
}

impl FileBacking {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StorageBacking for FileBacking {
    fn read(&self) -> AppResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(AppError::Storage(error.to_string())),
        }
    }

    // Writes through a sibling temp file and renames over the target, so a
    // failed save never corrupts the previous document.
    fn write(&self, contents: &str) -> AppResult<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|error| AppError::Storage(error.to_string()))?;

        let mut staged = tempfile::NamedTempFile::new_in(parent)
            .map_err(|error| AppError::Storage(error.to_string()))?;
        staged
            .write_all(contents.as_bytes())
            .map_err(|error| AppError::Storage(error.to_string()))?;
        staged
            .persist(&self.path)
            .map_err(|error| AppError::Storage(error.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBacking {
    contents: Mutex<Option<String>>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBacking for MemoryBacking {
    fn read(&self) -> AppResult<Option<String>> {
        let contents = self
            .contents
            .lock()
            .map_err(|_| AppError::Storage("memory backing lock poisoned".to_string()))?;
        Ok(contents.clone())
    }

    fn write(&self, new_contents: &str) -> AppResult<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| AppError::Storage("memory backing lock poisoned".to_string()))?;
        *contents = Some(new_contents.to_string());
        Ok(())
    }
}

/// Read-modify-write store for the whole multi-user document.
///
/// Every mutation loads the full document, transforms it in memory and
/// writes it back unconditionally; there is no partial update and no
/// versioning, so between processes the last writer wins. Within one
/// process the `write_guard` serializes each load+mutate+save cycle.
pub struct DocumentStore {
    backing: Box<dyn StorageBacking>,
    write_guard: Mutex<()>,
}

impl DocumentStore {
    pub fn new(backing: Box<dyn StorageBacking>) -> Self {
        Self {
            backing,
            write_guard: Mutex::new(()),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileBacking::new(path)))
    }

    pub fn load(&self) -> AppResult<Document> {
        let Some(contents) = self.backing.read()? else {
            tracing::debug!("no backing document yet; starting empty");
            return Ok(Document::new());
        };
        serde_yaml::from_str(&contents).map_err(AppError::from)
    }

    pub fn save(&self, doc: &Document) -> AppResult<()> {
        let contents = serde_yaml::to_string(doc)?;
        self.backing.write(&contents)
    }

    /// Runs one load+mutate+save cycle as a unit under the store's lock.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Document) -> AppResult<T>) -> AppResult<T> {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| AppError::Storage("document lock poisoned".to_string()))?;
        let mut doc = self.load()?;
        let result = mutate(&mut doc)?;
        self.save(&doc)?;
        Ok(result)
    }

    pub fn add_entry(
        &self,
        user_id: &str,
        datetime: &str,
        measurement: Measurement,
    ) -> AppResult<()> {
        let key = parse_civil_datetime(datetime)?;
        self.update(|doc| {
            let account = required_account_mut(doc, user_id)?;
            account.records = account.records.upsert(key, measurement);
            Ok(())
        })
    }

    /// Edit is delete-then-insert: the addressed entry is dropped and the
    /// resubmitted one (which may carry a different timestamp) takes its place.
    pub fn edit_entry(
        &self,
        user_id: &str,
        encoded_key: &str,
        datetime: &str,
        measurement: Measurement,
    ) -> AppResult<()> {
        let old_key = decode_key(encoded_key)?;
        let new_key = parse_civil_datetime(datetime)?;
        self.update(|doc| {
            let account = required_account_mut(doc, user_id)?;
            account.records = account.records.remove(&old_key).upsert(new_key, measurement);
            Ok(())
        })
    }

    pub fn delete_entry(&self, user_id: &str, encoded_key: &str) -> AppResult<()> {
        let key = decode_key(encoded_key)?;
        self.update(|doc| {
            let account = required_account_mut(doc, user_id)?;
            account.records = account.records.remove(&key);
            Ok(())
        })
    }

    pub fn entry_measurement(
        &self,
        user_id: &str,
        encoded_key: &str,
    ) -> AppResult<Option<Measurement>> {
        let key = decode_key(encoded_key)?;
        let doc = self.load()?;
        Ok(user_records(&doc, user_id).and_then(|records| records.get(&key).copied()))
    }

    pub fn create_account(&self, user_id: &str, secret: &str) -> AppResult<()> {
        self.update(|doc| {
            *doc = create_account(doc, user_id, secret)?;
            Ok(())
        })
    }
}

pub fn user_records<'doc>(doc: &'doc Document, user_id: &str) -> Option<&'doc RecordMapping> {
    doc.get(user_id).map(|account| &account.records)
}

pub fn with_updated_records(
    doc: &Document,
    user_id: &str,
    records: RecordMapping,
) -> AppResult<Document> {
    let mut next = doc.clone();
    let account = required_account_mut(&mut next, user_id)?;
    account.records = records;
    Ok(next)
}

pub fn create_account(doc: &Document, user_id: &str, secret: &str) -> AppResult<Document> {
    let user_id = user_id.trim();
    if user_id.is_empty() || doc.contains_key(user_id) {
        return Err(AppError::DuplicateUser(format!(
            "cannot create account '{}'",
            user_id
        )));
    }
    let mut next = doc.clone();
    next.insert(
        user_id.to_string(),
        UserAccount {
            secret: secret.to_string(),
            records: RecordMapping::new(),
        },
    );
    Ok(next)
}

/// The check the sign-up form runs before an account ever reaches the store.
pub fn validate_new_password(first: &str, second: &str) -> AppResult<()> {
    if first.is_empty() || first != second {
        return Err(AppError::PasswordMismatch(
            "passwords must match and be non-empty".to_string(),
        ));
    }
    Ok(())
}

pub fn valid_credentials(doc: &Document, user_id: &str, secret: &str) -> bool {
    doc.get(user_id)
        .map(|account| account.secret == secret)
        .unwrap_or(false)
}

fn required_account_mut<'doc>(
    doc: &'doc mut Document,
    user_id: &str,
) -> AppResult<&'doc mut UserAccount> {
    doc.get_mut(user_id)
        .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", user_id)))
}
