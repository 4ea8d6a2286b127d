use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};
use quotekeeper_core::quotes::errors::Result;
use quotekeeper_core::quotes::{LocalStore, Quote};

use crate::errors::StorageError;

/// File holding the quote collection as a JSON array.
pub const QUOTES_FILE: &str = "quotes.json";
/// File holding the last viewed quote as a JSON object.
pub const LAST_VIEWED_FILE: &str = "last_quote.json";
/// File holding the selected category as plain text.
pub const SELECTED_CATEGORY_FILE: &str = "selected_category";

/// [`LocalStore`] backed by JSON files in a single directory.
///
/// Every write goes to a temporary file that is then renamed over the target,
/// so a crash mid-write leaves the previous contents intact.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        debug!("Quote store opened at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Reads a file, treating a missing file as `None`.
    fn read(&self, file: &str) -> std::result::Result<Option<String>, StorageError> {
        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn write(&self, file: &str, contents: &str) -> std::result::Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.path(file);
        let tmp = self.path(&format!("{}.tmp", file));
        fs::write(&tmp, contents).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))
    }

    fn remove(&self, file: &str) -> std::result::Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.path(file);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

impl LocalStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Quote>> {
        let Some(contents) = self.read(QUOTES_FILE)? else {
            return Ok(Vec::new());
        };
        let stored: Vec<Quote> = serde_json::from_str(&contents)
            .map_err(|e| StorageError::json(self.path(QUOTES_FILE), e))?;

        let total = stored.len();
        let quotes: Vec<Quote> = stored
            .into_iter()
            .filter_map(|quote| match quote.normalized() {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!("Dropping invalid stored quote: {}", e);
                    None
                }
            })
            .collect();
        debug!("Loaded {} of {} stored quotes", quotes.len(), total);
        Ok(quotes)
    }

    fn save(&self, quotes: &[Quote]) -> Result<()> {
        let contents = serde_json::to_string(quotes)
            .map_err(|e| StorageError::json(self.path(QUOTES_FILE), e))?;
        self.write(QUOTES_FILE, &contents)?;
        debug!("Saved {} quotes", quotes.len());
        Ok(())
    }

    fn load_last_viewed(&self) -> Result<Option<Quote>> {
        let Some(contents) = self.read(LAST_VIEWED_FILE)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Quote>(&contents) {
            Ok(quote) => Ok(Some(quote)),
            Err(e) => {
                warn!("Ignoring unreadable last viewed quote: {}", e);
                Ok(None)
            }
        }
    }

    fn save_last_viewed(&self, quote: &Quote) -> Result<()> {
        let contents = serde_json::to_string(quote)
            .map_err(|e| StorageError::json(self.path(LAST_VIEWED_FILE), e))?;
        Ok(self.write(LAST_VIEWED_FILE, &contents)?)
    }

    fn load_selected_category(&self) -> Result<Option<String>> {
        Ok(self
            .read(SELECTED_CATEGORY_FILE)?
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()))
    }

    fn save_selected_category(&self, category: &str) -> Result<()> {
        Ok(self.write(SELECTED_CATEGORY_FILE, category.trim())?)
    }

    fn clear(&self) -> Result<()> {
        self.remove(QUOTES_FILE)?;
        self.remove(LAST_VIEWED_FILE)?;
        Ok(())
    }
}
