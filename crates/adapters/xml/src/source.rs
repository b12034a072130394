//! Where module descriptor documents come from.
//!
//! A module ships its documents in a fixed layout:
//!
//! | Path | Content |
//! |------|---------|
//! | `ESH-INF/thing/*.xml` | `<thing-descriptions>` |
//! | `ESH-INF/config/*.xml` | `<config-descriptions>` |
//! | `ESH-INF/i18n/*.properties` | translation bundles |

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use smarthome_app::module::ModuleId;

use crate::error::DescriptorError;

const DESCRIPTOR_DIR: &str = "ESH-INF";

/// One document and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedDocument {
    pub name: String,
    pub content: String,
}

impl NamedDocument {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Everything a module ships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDocuments {
    /// Thing and config description documents.
    pub descriptors: Vec<NamedDocument>,
    /// `.properties` bundles, named by file name.
    pub translations: Vec<NamedDocument>,
}

/// Read access to the descriptor documents of modules.
pub trait DescriptorSource: Send + Sync {
    /// Modules this source can read.
    fn modules(&self) -> impl Future<Output = Result<Vec<ModuleId>, DescriptorError>> + Send;

    /// All documents of `module`.
    fn read_documents(
        &self,
        module: &ModuleId,
    ) -> impl Future<Output = Result<ModuleDocuments, DescriptorError>> + Send;
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DescriptorError + '_ {
    move |source| DescriptorError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Reads `<root>/<module>/ESH-INF/...` from disk.
#[derive(Debug, Clone)]
pub struct DirectoryDescriptorSource {
    root: PathBuf,
}

impl DirectoryDescriptorSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files of `dir` with the given extension, sorted by name. A missing
    /// directory has no files.
    async fn read_files(dir: &Path, extension: &str) -> Result<Vec<(String, String)>, DescriptorError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(dir)(err)),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(dir))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            let content = tokio::fs::read_to_string(&path).await.map_err(io_error(&path))?;
            files.push((file_name, content));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

impl DescriptorSource for DirectoryDescriptorSource {
    async fn modules(&self) -> Result<Vec<ModuleId>, DescriptorError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(root = %self.root.display(), "addons directory does not exist");
                return Ok(Vec::new());
            }
            Err(err) => return Err(io_error(&self.root)(err)),
        };
        let mut modules = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&self.root))? {
            let path = entry.path();
            if !tokio::fs::try_exists(path.join(DESCRIPTOR_DIR)).await.unwrap_or(false) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                modules.push(ModuleId::new(name));
            }
        }
        modules.sort();
        Ok(modules)
    }

    async fn read_documents(&self, module: &ModuleId) -> Result<ModuleDocuments, DescriptorError> {
        let base = self.root.join(module.as_str()).join(DESCRIPTOR_DIR);
        if !tokio::fs::try_exists(&base).await.map_err(io_error(&base))? {
            return Err(DescriptorError::UnknownModule(module.to_string()));
        }

        let mut documents = ModuleDocuments::default();
        for folder in ["thing", "config"] {
            for (file_name, content) in Self::read_files(&base.join(folder), "xml").await? {
                documents.descriptors.push(NamedDocument::new(
                    format!("{module}/{DESCRIPTOR_DIR}/{folder}/{file_name}"),
                    content,
                ));
            }
        }
        for (file_name, content) in Self::read_files(&base.join("i18n"), "properties").await? {
            documents.translations.push(NamedDocument::new(file_name, content));
        }
        tracing::debug!(
            %module,
            descriptors = documents.descriptors.len(),
            translations = documents.translations.len(),
            "module documents read"
        );
        Ok(documents)
    }
}

/// In-memory documents, for bindings that embed their descriptors.
#[derive(Debug, Clone, Default)]
pub struct StaticDescriptorSource {
    modules: BTreeMap<ModuleId, ModuleDocuments>,
}

impl StaticDescriptorSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_descriptor(mut self, module: &ModuleId, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.modules
            .entry(module.clone())
            .or_default()
            .descriptors
            .push(NamedDocument::new(name, content));
        self
    }

    #[must_use]
    pub fn with_translation(mut self, module: &ModuleId, file_name: impl Into<String>, content: impl Into<String>) -> Self {
        self.modules
            .entry(module.clone())
            .or_default()
            .translations
            .push(NamedDocument::new(file_name, content));
        self
    }
}

impl DescriptorSource for StaticDescriptorSource {
    async fn modules(&self) -> Result<Vec<ModuleId>, DescriptorError> {
        Ok(self.modules.keys().cloned().collect())
    }

    async fn read_documents(&self, module: &ModuleId) -> Result<ModuleDocuments, DescriptorError> {
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| DescriptorError::UnknownModule(module.to_string()))
    }
}
