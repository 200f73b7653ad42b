//! Template store: persisted, replayable mappings for recurring layouts.
//!
//! Templates are stored as JSON files named after a normalized provider
//! key. Writes build the full new record and replace the old file via a
//! temp-file rename, so a concurrent reader never sees a partial record;
//! concurrent saves under the same key are last-write-wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use prs_model::Template;

use crate::synonyms::{SynonymMap, append_learned};

/// Metadata about a stored template.
#[derive(Debug, Clone)]
pub struct TemplateMetadata {
    pub provider: String,
    pub file_path: PathBuf,
    pub mapped_count: usize,
    pub unmapped_count: usize,
    pub saved_at: Option<String>,
}

/// File-system backed store keyed by provider name.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    base_dir: PathBuf,
}

impl TemplateStore {
    /// Create a store at the given directory, creating it if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("create template store: {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save a template, stamping `saved_at`. Returns the file path.
    pub fn save(&self, template: &Template) -> Result<PathBuf> {
        let mut record = template.clone();
        record.saved_at = Some(Utc::now().to_rfc3339());
        let path = self.base_dir.join(template_filename(&record.provider));
        let json = serde_json::to_string_pretty(&record)
            .with_context(|| format!("serialize template for {}", record.provider))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write template to {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("replace template at {}", path.display()))?;
        Ok(path)
    }

    /// Save a template and promote its user-override pairs into the
    /// learned synonym layer. Returns the file path and the number of
    /// synonyms learned.
    pub fn save_and_learn(
        &self,
        template: &Template,
        learned_synonyms_path: &Path,
    ) -> Result<(PathBuf, usize)> {
        let mut additions: SynonymMap = BTreeMap::new();
        for (header, field) in template.mapping.override_pairs() {
            additions
                .entry(field.to_string())
                .or_default()
                .push(header.to_string());
        }
        let learned = append_learned(learned_synonyms_path, &additions)?;
        let path = self.save(template)?;
        Ok((path, learned))
    }

    /// Load a template by provider key; `None` when absent.
    pub fn load(&self, provider: &str) -> Result<Option<Template>> {
        let path = self.base_dir.join(template_filename(provider));
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("read template from {}", path.display()))?;
        let template: Template = serde_json::from_str(&contents)
            .with_context(|| format!("parse template from {}", path.display()))?;
        Ok(Some(template))
    }

    pub fn exists(&self, provider: &str) -> bool {
        self.base_dir.join(template_filename(provider)).exists()
    }

    pub fn delete(&self, provider: &str) -> Result<bool> {
        let path = self.base_dir.join(template_filename(provider));
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("delete template: {}", path.display()))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// List stored templates, sorted by provider.
    pub fn list(&self) -> Result<Vec<TemplateMetadata>> {
        let mut metadata = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("read template store: {}", self.base_dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            if !filename.ends_with(".json") {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            if let Ok(template) = serde_json::from_str::<Template>(&contents) {
                metadata.push(TemplateMetadata {
                    provider: template.provider.clone(),
                    file_path: path,
                    mapped_count: template.mapping.mapped_count(),
                    unmapped_count: template.mapping.unmapped_headers().len(),
                    saved_at: template.saved_at.clone(),
                });
            }
        }
        metadata.sort_by(|a, b| a.provider.cmp(&b.provider));
        Ok(metadata)
    }
}

/// Normalize a provider key for use in filenames.
fn template_filename(provider: &str) -> String {
    let safe: String = provider
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{safe}.json")
}
