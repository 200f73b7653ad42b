//! Mapping engine: template replay, exact synonym lookup, similarity fallback.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;
use tracing::{debug, warn};

use prs_model::{ColumnEntry, ColumnMapping, MappingOrigin, SchemaContract, Template};

use crate::synonyms::SynonymBook;
use crate::utils::normalize_text;

/// Minimum normalized similarity for a fuzzy assignment.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;
/// Minimum fraction of current headers a template must match exactly for
/// its mapping to be replayed.
pub const TEMPLATE_REPLAY_MIN: f64 = 0.5;

/// Tunable thresholds for the automated mapping stages.
#[derive(Debug, Clone, Copy)]
pub struct MapperConfig {
    pub similarity_threshold: f64,
    pub replay_min_match: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: SIMILARITY_THRESHOLD,
            replay_min_match: TEMPLATE_REPLAY_MIN,
        }
    }
}

/// Engine mapping resolved header labels to canonical contract fields.
///
/// Three stages run in order, each only touching headers the previous
/// stages left unassigned:
/// 1. Template replay for headers that exactly match a prior template.
/// 2. Exact lookup in the layered synonym configuration.
/// 3. Jaro-Winkler similarity against field names and synonyms.
///
/// No automated stage ever assigns two headers to the same field; when a
/// fuzzy match would collide, the lower-confidence candidate stays
/// unmapped and is flagged for manual resolution.
pub struct MappingEngine<'a> {
    contract: &'a SchemaContract,
    synonyms: SynonymBook,
    config: MapperConfig,
}

struct Assignment {
    field: String,
    origin: MappingOrigin,
    confidence: f32,
}

impl<'a> MappingEngine<'a> {
    pub fn new(contract: &'a SchemaContract, synonyms: SynonymBook) -> Self {
        Self {
            contract,
            synonyms,
            config: MapperConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Suggest a mapping for the given headers, optionally replaying a
    /// prior template first.
    pub fn suggest(&self, headers: &[String], prior: Option<&Template>) -> ColumnMapping {
        let mut assigned: BTreeSet<String> = BTreeSet::new();
        let mut targets: BTreeMap<String, Assignment> = BTreeMap::new();
        let mut collisions: BTreeSet<String> = BTreeSet::new();

        if let Some(template) = prior {
            self.replay_template(headers, template, &mut assigned, &mut targets, &mut collisions);
        }
        self.match_synonyms(headers, &mut assigned, &mut targets, &mut collisions);
        self.match_similarity(headers, &mut assigned, &mut targets, &mut collisions);

        let entries = headers
            .iter()
            .map(|header| match targets.remove(header) {
                Some(assignment) => ColumnEntry {
                    source_header: header.clone(),
                    target_field: Some(assignment.field),
                    origin: assignment.origin,
                    confidence: assignment.confidence,
                },
                None => ColumnEntry {
                    source_header: header.clone(),
                    target_field: None,
                    origin: MappingOrigin::Similarity,
                    confidence: 0.0,
                },
            })
            .collect();

        ColumnMapping {
            entries,
            collisions: collisions.into_iter().collect(),
        }
    }

    fn replay_template(
        &self,
        headers: &[String],
        template: &Template,
        assigned: &mut BTreeSet<String>,
        targets: &mut BTreeMap<String, Assignment>,
        collisions: &mut BTreeSet<String>,
    ) {
        if headers.is_empty() {
            return;
        }
        let mut by_normalized: BTreeMap<String, &ColumnEntry> = BTreeMap::new();
        for entry in &template.mapping.entries {
            if entry.target_field.is_some() {
                by_normalized.insert(normalize_text(&entry.source_header), entry);
            }
        }

        let matched: Vec<(&String, &ColumnEntry)> = headers
            .iter()
            .filter_map(|header| {
                by_normalized
                    .get(&normalize_text(header))
                    .map(|entry| (header, *entry))
            })
            .collect();

        let before = targets.len();
        let fraction = matched.len() as f64 / headers.len() as f64;
        if fraction < self.config.replay_min_match {
            debug!(
                provider = %template.provider,
                matched = matched.len(),
                headers = headers.len(),
                "template replay skipped, match fraction below minimum"
            );
            return;
        }

        for (header, entry) in matched {
            let Some(field) = entry.target_field.clone() else {
                continue;
            };
            let key = field.to_lowercase();
            if assigned.contains(&key) {
                collisions.insert(header.clone());
                continue;
            }
            assigned.insert(key);
            targets.insert(
                header.clone(),
                Assignment {
                    field,
                    origin: entry.origin,
                    confidence: entry.confidence,
                },
            );
        }
        debug!(
            provider = %template.provider,
            replayed = targets.len() - before,
            "template replay applied"
        );
    }

    fn match_synonyms(
        &self,
        headers: &[String],
        assigned: &mut BTreeSet<String>,
        targets: &mut BTreeMap<String, Assignment>,
        collisions: &mut BTreeSet<String>,
    ) {
        for header in headers {
            if targets.contains_key(header) || collisions.contains(header) {
                continue;
            }
            let Some(field) = self.synonyms.lookup(header, self.contract) else {
                continue;
            };
            let key = field.to_lowercase();
            if assigned.contains(&key) {
                warn!(
                    header = %header,
                    field = %field,
                    "synonym match collides with an assigned field, left unmapped"
                );
                collisions.insert(header.clone());
                continue;
            }
            assigned.insert(key);
            targets.insert(
                header.clone(),
                Assignment {
                    field,
                    origin: MappingOrigin::SynonymExact,
                    confidence: 1.0,
                },
            );
        }
    }

    fn match_similarity(
        &self,
        headers: &[String],
        assigned: &mut BTreeSet<String>,
        targets: &mut BTreeMap<String, Assignment>,
        collisions: &mut BTreeSet<String>,
    ) {
        // Candidate scores per header, best first.
        let mut per_header: Vec<(&String, Vec<(String, f64)>)> = Vec::new();
        for header in headers {
            if targets.contains_key(header) || collisions.contains(header) {
                continue;
            }
            let normalized = normalize_text(header);
            if normalized.is_empty() {
                continue;
            }
            let mut scores: Vec<(String, f64)> = Vec::new();
            for field in &self.contract.fields {
                let score = self.field_score(&normalized, &field.name);
                scores.push((field.name.clone(), score));
            }
            scores.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            per_header.push((header, scores));
        }

        // Assign strongest headers first so a collision always drops the
        // lower-confidence candidate.
        per_header.sort_by(|a, b| {
            let a_top = a.1.first().map(|(_, score)| *score).unwrap_or(0.0);
            let b_top = b.1.first().map(|(_, score)| *score).unwrap_or(0.0);
            b_top
                .partial_cmp(&a_top)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        for (header, scores) in per_header {
            let Some((_, top_score)) = scores.first() else {
                continue;
            };
            if *top_score < self.config.similarity_threshold {
                continue;
            }
            // Ties prefer a field with fewer already-assigned headers.
            let top_score = *top_score;
            let tied: Vec<&(String, f64)> = scores
                .iter()
                .filter(|(_, score)| (top_score - score).abs() < f64::EPSILON)
                .collect();
            let pick = tied
                .iter()
                .find(|entry| !assigned.contains(&entry.0.to_lowercase()))
                .or_else(|| tied.first());
            let Some(entry) = pick else {
                continue;
            };
            let field = entry.0.clone();
            let score = entry.1;
            let key = field.to_lowercase();
            if assigned.contains(&key) {
                warn!(
                    header = %header,
                    field = %field,
                    score = %score,
                    "similarity match collides with an assigned field, left unmapped"
                );
                collisions.insert(header.clone());
                continue;
            }
            assigned.insert(key);
            targets.insert(
                header.clone(),
                Assignment {
                    field,
                    origin: MappingOrigin::Similarity,
                    confidence: score as f32,
                },
            );
        }
    }

    /// Best similarity between a normalized header and a field's name or
    /// any of its synonyms (contract-declared plus learned).
    fn field_score(&self, normalized_header: &str, field: &str) -> f64 {
        let mut best = jaro_similarity(
            normalized_header.chars(),
            normalize_text(field).chars(),
        );
        let declared = self
            .contract
            .field(field)
            .map(|f| f.synonyms.clone())
            .unwrap_or_default();
        for synonym in declared.iter().chain(self.synonyms.synonyms_for(field).iter()) {
            let score = jaro_similarity(
                normalized_header.chars(),
                normalize_text(synonym).chars(),
            );
            if score > best {
                best = score;
            }
        }
        best
    }
}
