//! Column mapping types linking raw header labels to canonical fields.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How a mapping entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingOrigin {
    /// Exact hit in the synonym configuration.
    SynonymExact,
    /// Approximate string-similarity match.
    Similarity,
    /// Supplied or corrected by the user; always wins.
    UserOverride,
}

/// One raw header and its (possibly absent) canonical assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub source_header: String,
    /// Canonical field name, or `None` when the header is unmapped.
    pub target_field: Option<String>,
    pub origin: MappingOrigin,
    /// 1.0 for exact and override origins, the similarity score otherwise.
    pub confidence: f32,
}

/// A full mapping for one header set.
///
/// Invariant: at most one entry carries any given canonical field.
/// Automated stages never create duplicates; [`ColumnMapping::apply_override`]
/// displaces a previous holder instead of duplicating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub entries: Vec<ColumnEntry>,
    /// Headers an automated stage declined to assign because the best
    /// candidate field was already taken. Surfaced for manual resolution.
    #[serde(default)]
    pub collisions: Vec<String>,
}

impl ColumnMapping {
    pub fn target_for(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.source_header == header)
            .and_then(|entry| entry.target_field.as_deref())
    }

    pub fn source_for(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .target_field
                    .as_deref()
                    .is_some_and(|target| target.eq_ignore_ascii_case(field))
            })
            .map(|entry| entry.source_header.as_str())
    }

    /// Assigned (header, field) pairs in entry order.
    pub fn mapped_pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .target_field
                    .as_deref()
                    .map(|target| (entry.source_header.as_str(), target))
            })
            .collect()
    }

    pub fn unmapped_headers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.target_field.is_none())
            .map(|entry| entry.source_header.as_str())
            .collect()
    }

    pub fn assigned_fields(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter_map(|entry| entry.target_field.clone())
            .collect()
    }

    pub fn mapped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.target_field.is_some())
            .count()
    }

    /// Apply a user decision for `header`, displacing any other entry that
    /// currently holds the same target field. The override wins regardless
    /// of what origin produced the previous assignment.
    pub fn apply_override(&mut self, header: &str, target: Option<String>) {
        if let Some(field) = target.as_deref() {
            for entry in &mut self.entries {
                if entry.source_header != header
                    && entry
                        .target_field
                        .as_deref()
                        .is_some_and(|current| current.eq_ignore_ascii_case(field))
                {
                    entry.target_field = None;
                }
            }
        }
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.source_header == header)
        {
            Some(entry) => {
                entry.target_field = target;
                entry.origin = MappingOrigin::UserOverride;
                entry.confidence = 1.0;
            }
            None => self.entries.push(ColumnEntry {
                source_header: header.to_string(),
                target_field: target,
                origin: MappingOrigin::UserOverride,
                confidence: 1.0,
            }),
        }
        self.collisions.retain(|name| name != header);
    }

    /// User-override pairs, the material promoted into learned synonyms
    /// when a template is saved.
    pub fn override_pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter(|entry| entry.origin == MappingOrigin::UserOverride)
            .filter_map(|entry| {
                entry
                    .target_field
                    .as_deref()
                    .map(|target| (entry.source_header.as_str(), target))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(header: &str, target: Option<&str>) -> ColumnEntry {
        ColumnEntry {
            source_header: header.to_string(),
            target_field: target.map(str::to_string),
            origin: MappingOrigin::SynonymExact,
            confidence: 1.0,
        }
    }

    #[test]
    fn override_displaces_previous_holder() {
        let mut mapping = ColumnMapping {
            entries: vec![entry("Vendor", Some("provider_id")), entry("Supplier", None)],
            collisions: vec!["Supplier".to_string()],
        };
        mapping.apply_override("Supplier", Some("provider_id".to_string()));

        assert_eq!(mapping.target_for("Supplier"), Some("provider_id"));
        assert_eq!(mapping.target_for("Vendor"), None);
        assert!(mapping.collisions.is_empty());
        // No duplicated target survives the override.
        let holders: Vec<_> = mapping
            .entries
            .iter()
            .filter(|e| e.target_field.as_deref() == Some("provider_id"))
            .collect();
        assert_eq!(holders.len(), 1);
    }

    #[test]
    fn override_can_unassign() {
        let mut mapping = ColumnMapping {
            entries: vec![entry("Vendor", Some("provider_id"))],
            collisions: Vec::new(),
        };
        mapping.apply_override("Vendor", None);
        assert_eq!(mapping.target_for("Vendor"), None);
        assert_eq!(mapping.unmapped_headers(), vec!["Vendor"]);
    }
}
