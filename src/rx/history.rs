use crate::rx::model::HistoryItem;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of writing the snapshot after a mutation. The in-memory change
/// stands either way.
#[derive(Debug)]
pub enum PersistOutcome {
    Saved,
    Failed(anyhow::Error),
}

/// Saved analyses, most recent first, persisted as one JSON array.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = load(&path);
        Self { path, items }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn find_by_id(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn append(&mut self, item: HistoryItem) -> PersistOutcome {
        self.items.insert(0, item);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn persist(&self) -> PersistOutcome {
        match save(&self.path, &self.items) {
            Ok(()) => PersistOutcome::Saved,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %format!("{err:#}"),
                    "failed to persist history"
                );
                PersistOutcome::Failed(err)
            }
        }
    }
}

/// A missing snapshot is empty history. One that does not parse is discarded;
/// one that cannot be read is left in place.
fn load(path: &Path) -> Vec<HistoryItem> {
    if !path.exists() {
        return Vec::new();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to read history snapshot; starting empty"
            );
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<HistoryItem>>(&raw) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "discarding corrupt history snapshot"
            );
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "failed to remove corrupt history snapshot"
                );
            }
            Vec::new()
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a sibling file and rename it over the snapshot, so an interrupted
/// write never leaves a truncated snapshot behind.
fn save(path: &Path, items: &[HistoryItem]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(items)?;
    let staging = staging_path(path);
    fs::write(&staging, format!("{data}\n"))
        .with_context(|| format!("failed to write {}", staging.display()))?;
    fs::rename(&staging, path).with_context(|| {
        format!(
            "failed to move {} to {}",
            staging.display(),
            path.display()
        )
    })?;
    Ok(())
}
