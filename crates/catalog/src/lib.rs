use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use dispatcher::{EventDispatcher, HandlerTable};
use sdk_integration::SdkProvider;
use shared::{
    domain::{EnvContext, HandlerId},
    protocol::{CatalogDocument, HandlerRecord},
};
use tracing::{debug, info};

pub mod legacy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }

    pub fn parse(self, raw: &str) -> Result<CatalogDocument> {
        match self {
            DocumentFormat::Json => Ok(serde_json::from_str(raw)?),
            DocumentFormat::Toml => Ok(toml::from_str(raw)?),
        }
    }
}

pub fn read_document(path: &Path) -> Result<CatalogDocument> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| anyhow!("unsupported catalog file '{}'", path.display()))?;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file '{}'", path.display()))?;
    format
        .parse(&raw)
        .with_context(|| format!("failed to parse catalog file '{}'", path.display()))
}

/// Immutable set of handler tables keyed by handler id.
#[derive(Debug, Clone, Default)]
pub struct HandlerCatalog {
    tables: BTreeMap<HandlerId, Arc<HandlerTable>>,
}

impl HandlerCatalog {
    /// Loads a single catalog document, or every `.json`/`.toml` document of
    /// a directory in file-name order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let files = if path.is_dir() {
            catalog_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut catalog = Self::default();
        for file in &files {
            let document = read_document(file)?;
            catalog
                .extend(document.handlers)
                .with_context(|| format!("invalid catalog file '{}'", file.display()))?;
        }

        info!(
            path = %path.display(),
            files = files.len(),
            handlers = catalog.len(),
            "handler catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let mut catalog = Self::default();
        catalog.extend(document.handlers)?;
        Ok(catalog)
    }

    fn extend(&mut self, records: Vec<HandlerRecord>) -> Result<()> {
        for record in records {
            let table = HandlerTable::from_record(record)?;
            match self.tables.entry(table.id().clone()) {
                Entry::Occupied(existing) => {
                    bail!("handler {} is defined more than once", existing.key())
                }
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(table));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<HandlerTable>> {
        self.tables.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &HandlerId> + '_ {
        self.tables.keys()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<HandlerTable>> + '_ {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn dispatcher(
        &self,
        id: &str,
        provider: Arc<dyn SdkProvider>,
        env: Option<EnvContext>,
    ) -> Option<EventDispatcher> {
        let table = Arc::clone(self.get(id)?);
        let dispatcher = EventDispatcher::new(table, provider);
        Some(match env {
            Some(env) => dispatcher.with_env(env),
            None => dispatcher,
        })
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            handlers: self.tables().map(|table| table.to_record()).collect(),
        }
    }
}

fn catalog_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list catalog directory '{}'", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if DocumentFormat::from_path(&path).is_some() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-catalog file");
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
