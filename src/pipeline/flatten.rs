//! Converts annotated extractions into flat rows.

use super::types::{AnnotatedExtraction, FlatRow};

/// Default separator for list-valued fields.
pub const DEFAULT_LIST_DELIMITER: &str = ", ";

fn join(items: &[String], delimiter: &str) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Flatten one annotated extraction.
pub fn flatten_one(result: &AnnotatedExtraction, delimiter: &str) -> FlatRow {
    let e = &result.extraction;
    FlatRow {
        id: result.id.clone(),
        description: result.description.clone(),
        brand: e.brand.clone().unwrap_or_default(),
        category: e.category.clone().unwrap_or_default(),
        sub_category: e.sub_category.clone().unwrap_or_default(),
        ingredients: join(&e.ingredients, delimiter),
        preparation_method: join(&e.preparation_method, delimiter),
        cultural_origin: e.cultural_origin.clone().unwrap_or_default(),
        state: e.state.clone().unwrap_or_default(),
        additional_features: join(&e.additional_features, delimiter),
    }
}

/// Flatten a list of annotated extractions, preserving order.
pub fn flatten(results: &[AnnotatedExtraction], delimiter: &str) -> Vec<FlatRow> {
    results.iter().map(|r| flatten_one(r, delimiter)).collect()
}
