use prs_map::{MapperConfig, MappingEngine, SynonymBook};
use prs_model::schema::default_contract;
use prs_model::{MappingOrigin, ReshapeConfig, Template};

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

#[test]
fn exact_synonyms_map_with_full_confidence() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));
    let mapping = engine.suggest(&headers(&["Vendor", "SKU", "Amount", "Mystery"]), None);

    assert_eq!(mapping.target_for("Vendor"), Some("provider_id"));
    assert_eq!(mapping.target_for("SKU"), Some("article_sku"));
    assert_eq!(mapping.target_for("Amount"), Some("sales_amount"));
    assert_eq!(mapping.target_for("Mystery"), None);

    let vendor = mapping
        .entries
        .iter()
        .find(|entry| entry.source_header == "Vendor")
        .expect("vendor entry");
    assert_eq!(vendor.origin, MappingOrigin::SynonymExact);
    assert_eq!(vendor.confidence, 1.0);
}

#[test]
fn order_number_maps_via_synonym_table() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));
    let mapping = engine.suggest(&headers(&["Order #"]), None);

    assert_eq!(mapping.target_for("Order #"), Some("order_id"));
    let entry = &mapping.entries[0];
    assert_eq!(entry.origin, MappingOrigin::SynonymExact);
}

#[test]
fn synonym_exact_wins_over_fuzzy() {
    // "Qty" is both an exact synonym of sales_qty and fuzzily close to it;
    // the exact stage must claim it first.
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));
    let mapping = engine.suggest(&headers(&["Qty"]), None);

    let entry = &mapping.entries[0];
    assert_eq!(entry.target_field.as_deref(), Some("sales_qty"));
    assert_eq!(entry.origin, MappingOrigin::SynonymExact);
    assert_eq!(entry.confidence, 1.0);
}

#[test]
fn similarity_maps_near_misses() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));
    // Close to the canonical name but no exact synonym.
    let mapping = engine.suggest(&headers(&["unit prices"]), None);

    let entry = &mapping.entries[0];
    assert_eq!(entry.target_field.as_deref(), Some("unit_price"));
    assert_eq!(entry.origin, MappingOrigin::Similarity);
    assert!(entry.confidence >= 0.8);
}

#[test]
fn automated_stages_never_duplicate_targets() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));
    // Both headers resolve to provider_id via synonyms; only one may win.
    let mapping = engine.suggest(&headers(&["Vendor", "Supplier"]), None);

    let holders: Vec<_> = mapping
        .entries
        .iter()
        .filter(|entry| entry.target_field.as_deref() == Some("provider_id"))
        .collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(mapping.collisions.len(), 1);

    // Property: no automated duplicate targets at all.
    let mut seen = std::collections::BTreeSet::new();
    for entry in &mapping.entries {
        if let Some(target) = &entry.target_field {
            assert!(seen.insert(target.clone()), "duplicate target {target}");
        }
    }
}

#[test]
fn below_threshold_headers_stay_unmapped() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract))
        .with_config(MapperConfig {
            similarity_threshold: 0.95,
            replay_min_match: 0.5,
        });
    let mapping = engine.suggest(&headers(&["warehouse_zone"]), None);
    assert_eq!(mapping.target_for("warehouse_zone"), None);
}

#[test]
fn template_replay_reuses_confirmed_mapping() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));

    // A confirmed template mapping a header no automated stage reaches.
    let mut confirmed = engine.suggest(&headers(&["Vendor", "Menge"]), None);
    confirmed.apply_override("Menge", Some("sales_qty".to_string()));
    let template = Template::new("acme", confirmed, ReshapeConfig::default());

    let replayed = engine.suggest(&headers(&["Vendor", "Menge", "Extra"]), Some(&template));
    assert_eq!(replayed.target_for("Menge"), Some("sales_qty"));
    // The replayed entry keeps its override origin.
    let menge = replayed
        .entries
        .iter()
        .find(|entry| entry.source_header == "Menge")
        .expect("menge entry");
    assert_eq!(menge.origin, MappingOrigin::UserOverride);
}

#[test]
fn template_replay_skipped_when_too_few_headers_match() {
    let contract = default_contract();
    let engine = MappingEngine::new(&contract, SynonymBook::from_contract(&contract));

    let mut confirmed = engine.suggest(&headers(&["Menge"]), None);
    confirmed.apply_override("Menge", Some("sales_qty".to_string()));
    let template = Template::new("acme", confirmed, ReshapeConfig::default());

    // Only one of five headers matches the template; replay must not fire,
    // and "Menge" has no synonym or similarity route either.
    let mapping = engine.suggest(
        &headers(&["Menge", "colA", "colB", "colC", "colD"]),
        Some(&template),
    );
    assert_eq!(mapping.target_for("Menge"), None);
}
