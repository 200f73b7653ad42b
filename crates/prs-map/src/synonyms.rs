//! Layered synonym configuration.
//!
//! Two key-value layers feed automated mapping: shared defaults (the
//! contract's own synonym sets, optionally extended by a shared JSON file)
//! and user-learned entries appended whenever a confirmed template is
//! saved. Learned entries take precedence on conflict. The learned file is
//! only ever appended to, via an atomic read-merge-write.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use prs_model::SchemaContract;

use crate::utils::normalize_text;

/// Canonical field name -> known raw header synonyms.
pub type SynonymMap = BTreeMap<String, Vec<String>>;

/// Read a synonym layer from a JSON file; a missing file is an empty layer.
pub fn read_synonym_file(path: &Path) -> Result<SynonymMap> {
    if !path.exists() {
        return Ok(SynonymMap::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read synonyms from {}", path.display()))?;
    let map: SynonymMap = serde_json::from_str(&contents)
        .with_context(|| format!("parse synonyms from {}", path.display()))?;
    Ok(map)
}

fn merge_into(base: &mut SynonymMap, additions: &SynonymMap) -> usize {
    let mut added = 0usize;
    for (field, values) in additions {
        let entry = base.entry(field.clone()).or_default();
        for value in values {
            let exists = entry
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(value));
            if !exists {
                entry.push(value.clone());
                added += 1;
            }
        }
    }
    added
}

/// Append new pairs to the learned layer on disk.
///
/// The merge never deletes existing entries. The full merged record is
/// written to a temp file and renamed into place, so concurrent readers
/// never observe a partial write. Returns the number of entries added.
pub fn append_learned(path: &Path, additions: &SynonymMap) -> Result<usize> {
    if additions.is_empty() {
        return Ok(0);
    }
    let mut merged = read_synonym_file(path)?;
    let added = merge_into(&mut merged, additions);
    if added == 0 {
        return Ok(0);
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create synonym dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&merged).context("serialize learned synonyms")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("write learned synonyms to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("replace learned synonyms at {}", path.display()))?;
    Ok(added)
}

/// Merged view over the synonym layers used by the mapping engine.
#[derive(Debug, Clone, Default)]
pub struct SynonymBook {
    shared: SynonymMap,
    learned: SynonymMap,
}

impl SynonymBook {
    /// Seed the shared layer from the contract's own synonym sets.
    pub fn from_contract(contract: &SchemaContract) -> Self {
        let mut shared = SynonymMap::new();
        for field in &contract.fields {
            if !field.synonyms.is_empty() {
                shared.insert(field.name.clone(), field.synonyms.clone());
            }
        }
        Self {
            shared,
            learned: SynonymMap::new(),
        }
    }

    /// Merge an additional shared layer (e.g. a site-wide synonyms file).
    pub fn with_shared_layer(mut self, layer: &SynonymMap) -> Self {
        merge_into(&mut self.shared, layer);
        self
    }

    /// Merge the user-learned layer.
    pub fn with_learned_layer(mut self, layer: &SynonymMap) -> Self {
        merge_into(&mut self.learned, layer);
        self
    }

    /// Resolve a raw header to a canonical field by exact normalized match.
    ///
    /// The canonical field name itself always matches; otherwise learned
    /// entries are consulted before shared ones.
    pub fn lookup(&self, header: &str, contract: &SchemaContract) -> Option<String> {
        let normalized = normalize_text(header);
        if normalized.is_empty() {
            return None;
        }
        for field in &contract.fields {
            if normalize_text(&field.name) == normalized {
                return Some(field.name.clone());
            }
        }
        for layer in [&self.learned, &self.shared] {
            for (field, values) in layer {
                if values
                    .iter()
                    .any(|value| normalize_text(value) == normalized)
                {
                    return Some(field.clone());
                }
            }
        }
        None
    }

    /// All synonyms known for a field, learned entries first.
    pub fn synonyms_for(&self, field: &str) -> Vec<String> {
        let mut values = Vec::new();
        for layer in [&self.learned, &self.shared] {
            for (candidate, entries) in layer {
                if candidate.eq_ignore_ascii_case(field) {
                    for entry in entries {
                        if !values
                            .iter()
                            .any(|existing: &String| existing.eq_ignore_ascii_case(entry))
                        {
                            values.push(entry.clone());
                        }
                    }
                }
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prs_model::schema::default_contract;

    #[test]
    fn learned_entries_take_precedence() {
        let contract = default_contract();
        let mut learned = SynonymMap::new();
        // "source" is a shared synonym for provider_id; a user decided it
        // means region in their files.
        learned.insert("region".to_string(), vec!["source".to_string()]);
        let book = SynonymBook::from_contract(&contract).with_learned_layer(&learned);
        assert_eq!(book.lookup("Source", &contract), Some("region".to_string()));
    }

    #[test]
    fn canonical_name_always_matches() {
        let contract = default_contract();
        let book = SynonymBook::from_contract(&contract);
        assert_eq!(
            book.lookup("Article SKU", &contract),
            Some("article_sku".to_string())
        );
    }

    #[test]
    fn order_number_synonym_matches() {
        let contract = default_contract();
        let book = SynonymBook::from_contract(&contract);
        assert_eq!(
            book.lookup("Order #", &contract),
            Some("order_id".to_string())
        );
    }
}
