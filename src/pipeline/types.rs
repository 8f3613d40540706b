//! Records flowing through the pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::preprocess::Preprocessor;

/// One input row: stable identifier, original text, standardized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRecord {
    pub id: String,
    pub raw: String,
    pub standardized: String,
}

impl DescriptionRecord {
    pub fn new(id: impl Into<String>, raw: impl Into<String>, preprocessor: &Preprocessor) -> Self {
        let raw = raw.into();
        let standardized = preprocessor.standardize(&raw);
        Self {
            id: id.into(),
            raw,
            standardized,
        }
    }
}

/// Entities the model extracts for one description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(rename = "Brand", default, deserialize_with = "lenient_scalar")]
    pub brand: Option<String>,
    #[serde(rename = "Category", default, deserialize_with = "lenient_scalar")]
    pub category: Option<String>,
    #[serde(
        rename = "Sub-Category",
        alias = "Sub Category",
        alias = "SubCategory",
        default,
        deserialize_with = "lenient_scalar"
    )]
    pub sub_category: Option<String>,
    #[serde(rename = "Ingredients", default, deserialize_with = "lenient_list")]
    pub ingredients: Vec<String>,
    #[serde(
        rename = "Preparation Method",
        alias = "Preparation Methods",
        default,
        deserialize_with = "lenient_list"
    )]
    pub preparation_method: Vec<String>,
    #[serde(rename = "Cultural Origin", default, deserialize_with = "lenient_scalar")]
    pub cultural_origin: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "lenient_scalar")]
    pub state: Option<String>,
    #[serde(
        rename = "Additional Features",
        alias = "Additional Feature",
        default,
        deserialize_with = "lenient_list"
    )]
    pub additional_features: Vec<String>,
}

/// An extraction paired with the record it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedExtraction {
    pub id: String,
    pub description: String,
    pub extraction: Extraction,
}

/// Tabular form of an annotated extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    pub id: String,
    pub description: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Ingredients")]
    pub ingredients: String,
    #[serde(rename = "Preparation Method")]
    pub preparation_method: String,
    #[serde(rename = "Cultural Origin")]
    pub cultural_origin: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Additional Features")]
    pub additional_features: String,
}

fn value_to_string(value: Value) -> Option<String> {
    let s = match value {
        Value::Null => return None,
        Value::String(s) => s,
        other => other.to_string(),
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accept a string, number, bool, null, or list (joined with ", ").
fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_string).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Some(other) => value_to_string(other),
        None => None,
    })
}

/// Accept a list, a single scalar (one-item list), or null.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_string).collect(),
        Some(other) => value_to_string(other).into_iter().collect(),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_full_object() {
        let json = r#"{
            "Brand": "Kellogg's",
            "Category": "Cereals",
            "Sub-Category": "Breakfast Cereal",
            "Ingredients": ["Corn", "Sugar"],
            "Preparation Method": ["Ready To Eat"],
            "Cultural Origin": null,
            "State": "Solid",
            "Additional Features": ["Fortified"]
        }"#;
        let extraction: Extraction = serde_json::from_str(json).unwrap();
        assert_eq!(extraction.brand.as_deref(), Some("Kellogg's"));
        assert_eq!(extraction.ingredients, vec!["Corn", "Sugar"]);
        assert_eq!(extraction.cultural_origin, None);
        assert_eq!(extraction.additional_features, vec!["Fortified"]);
    }

    #[test]
    fn test_extraction_missing_and_odd_fields() {
        let json = r#"{
            "Category": "Beverages",
            "Ingredients": "Water",
            "Preparation Method": null,
            "State": "",
            "Additional Features": ["Low Fat", null, 2]
        }"#;
        let extraction: Extraction = serde_json::from_str(json).unwrap();
        assert_eq!(extraction.brand, None);
        assert_eq!(extraction.ingredients, vec!["Water"]);
        assert!(extraction.preparation_method.is_empty());
        assert_eq!(extraction.state, None);
        assert_eq!(extraction.additional_features, vec!["Low Fat", "2"]);
    }

    #[test]
    fn test_extraction_rejects_non_object() {
        let parsed = serde_json::from_str::<Extraction>(r#""just a string""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_description_record_standardizes() {
        let pre = Preprocessor::default();
        let record = DescriptionRecord::new("42", "fr veg", &pre);
        assert_eq!(record.id, "42");
        assert_eq!(record.raw, "fr veg");
        assert_eq!(record.standardized, "FRESH VEGETABLE");
    }
}
