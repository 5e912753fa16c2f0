use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A product with known physical attributes, used as a reference example
/// when enriching a prompt. Dimensions are centimetres, weight kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub length: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: f64,
}

impl ReferenceProduct {
    pub fn new(
        name: &str,
        description: &str,
        category: &str,
        (length, width, height): (f64, f64, f64),
        weight: f64,
    ) -> Self {
        Self {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            length,
            width,
            height,
            weight,
        }
    }
}

/// Reads a number, a numeric string, or anything else as `0.0`.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Predicted physical attributes for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionPrediction {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_product_tolerates_missing_fields() {
        let product: ReferenceProduct = serde_json::from_str(r#"{"name": "Lamp"}"#).unwrap();
        assert_eq!(product.name.as_deref(), Some("Lamp"));
        assert!(product.description.is_none());
        assert_eq!(product.weight, 0.0);
    }

    #[test]
    fn test_reference_product_reads_loose_numbers() {
        let product: ReferenceProduct = serde_json::from_str(
            r#"{"name": "Lamp", "length": null, "width": "12.5", "height": "tall", "weight": 3}"#,
        )
        .unwrap();
        assert_eq!(product.length, 0.0);
        assert_eq!(product.width, 12.5);
        assert_eq!(product.height, 0.0);
        assert_eq!(product.weight, 3.0);
    }

    #[test]
    fn test_prediction_json_field_names() {
        let prediction = DimensionPrediction {
            length: 10.0,
            width: 5.0,
            height: 2.0,
            weight: 0.5,
            confidence_score: 0.85,
        };
        let value = serde_json::to_value(&prediction).unwrap();
        assert_eq!(value["confidence_score"], 0.85);
        assert_eq!(value["length"], 10.0);
    }
}
