use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Declared type of a canonical field in the output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    /// Parse a type name as found in contract files (case-insensitive,
    /// accepting the common aliases the original config files used).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "str" | "string" => Ok(FieldType::Text),
            "number" | "numeric" | "float" | "int" | "integer" => Ok(FieldType::Number),
            "date" | "datetime" => Ok(FieldType::Date),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            other => Err(format!("Unknown field type: {other}")),
        }
    }
}

/// One entry of the canonical output contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Known alternate raw header texts for this field.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl CanonicalField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            synonyms: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

/// The canonical schema contract: process-wide, read-only, loaded once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaContract {
    pub fields: Vec<CanonicalField>,
}

impl SchemaContract {
    /// Build a contract, enforcing that field names are unique.
    pub fn new(fields: Vec<CanonicalField>) -> Result<Self, ContractError> {
        if fields.is_empty() {
            return Err(ContractError::Empty);
        }
        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.name.to_lowercase()) {
                return Err(ContractError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// Load a contract from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a contract from JSON, enforcing field-name uniqueness.
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        let parsed: SchemaContract = serde_json::from_str(json)?;
        Self::new(parsed.fields)
    }

    /// Look up a field by canonical name (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&CanonicalField> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> Vec<&CanonicalField> {
        self.fields.iter().filter(|field| field.required).collect()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}

/// The built-in provider reporting contract used when no contract file is
/// supplied. Synonyms mirror the shared defaults shipped with the tool.
pub fn default_contract() -> SchemaContract {
    let fields = vec![
        CanonicalField::new("provider_id", FieldType::Text)
            .required()
            .with_synonyms(["provider", "vendor", "supplier", "source", "partner"]),
        CanonicalField::new("article_sku", FieldType::Text)
            .required()
            .with_synonyms(["sku", "item", "material", "product", "article"]),
        CanonicalField::new("report_date", FieldType::Date)
            .required()
            .with_synonyms(["date", "period", "month", "time", "year"]),
        CanonicalField::new("sales_qty", FieldType::Number)
            .with_synonyms(["qty", "quantity", "units", "volume"]),
        CanonicalField::new("sales_amount", FieldType::Number)
            .required()
            .with_synonyms(["amount", "total", "revenue", "sales", "net", "gross"]),
        CanonicalField::new("order_id", FieldType::Text).with_synonyms([
            "order",
            "order #",
            "order no",
            "orderid",
            "po number",
            "reference",
        ]),
        CanonicalField::new("region", FieldType::Text).with_synonyms(["area", "location"]),
        CanonicalField::new("unit_price", FieldType::Number)
            .with_synonyms(["price", "unit cost", "rate"]),
        CanonicalField::new("promo_flag", FieldType::Boolean)
            .with_synonyms(["promo", "on promotion", "discounted"]),
    ];
    // Field names are statically unique; bypass the constructor check.
    SchemaContract { fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_parses_aliases() {
        assert_eq!("String".parse::<FieldType>(), Ok(FieldType::Text));
        assert_eq!("NUMERIC".parse::<FieldType>(), Ok(FieldType::Number));
        assert_eq!("datetime".parse::<FieldType>(), Ok(FieldType::Date));
        assert!("blob".parse::<FieldType>().is_err());
    }

    #[test]
    fn default_contract_has_unique_required_fields() {
        let contract = default_contract();
        let required: Vec<&str> = contract
            .required_fields()
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        assert!(required.contains(&"provider_id"));
        assert!(required.contains(&"report_date"));
        assert!(required.contains(&"sales_amount"));
    }

    #[test]
    fn contract_round_trips_through_json() {
        let contract = default_contract();
        let json = serde_json::to_string(&contract).expect("serialize");
        let round = SchemaContract::from_json(&json).expect("parse");
        assert_eq!(round.fields.len(), contract.fields.len());
        assert!(round.field("Order_ID").is_some());
    }
}
