pub mod error;
pub mod mapping;
pub mod months;
pub mod outcome;
pub mod schema;
pub mod table;
pub mod template;

pub use error::ContractError;
pub use mapping::{ColumnEntry, ColumnMapping, MappingOrigin};
pub use months::{month_number, normalize_month};
pub use outcome::{OutcomeRecord, OutcomeState, Violation, ViolationKind};
pub use schema::{CanonicalField, FieldType, SchemaContract};
pub use table::RawTable;
pub use template::{ReshapeConfig, Template};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_rejects_duplicate_fields() {
        let fields = vec![
            CanonicalField::new("provider_id", FieldType::Text),
            CanonicalField::new("provider_id", FieldType::Text),
        ];
        assert!(SchemaContract::new(fields).is_err());
    }

    #[test]
    fn outcome_record_serializes() {
        let record = OutcomeRecord::quarantined(
            "acme_march.csv",
            vec![Violation {
                kind: ViolationKind::MissingRequiredField,
                field: "provider_id".to_string(),
                row: None,
                message: "required column provider_id not found".to_string(),
            }],
        );
        let json = serde_json::to_string(&record).expect("serialize record");
        let round: OutcomeRecord = serde_json::from_str(&json).expect("deserialize record");
        assert_eq!(round.state, OutcomeState::Quarantined);
        assert_eq!(round.violations.len(), 1);
    }
}
