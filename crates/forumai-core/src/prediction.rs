//! Prediction records produced by the inference pipeline.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Per-label probabilities in label-set declaration order.
///
/// Serialised as a JSON object. Entry order follows the classifier's label
/// order on both serialisation and deserialisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityMap(Vec<(String, f64)>);

impl ProbabilityMap {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self(entries)
    }

    /// Probability for `label`, if the label is present.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, p)| (l.as_str(), *p))
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, p)| p).sum()
    }
}

impl Serialize for ProbabilityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, p) in &self.0 {
            map.serialize_entry(label, p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProbabilityMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ProbabilityMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, p)) = access.next_entry::<String, f64>()? {
                    entries.push((label, p));
                }
                Ok(ProbabilityMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Full result of classifying a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Winning label (first maximal label in declaration order).
    pub label: String,
    /// Maximum probability in the distribution.
    pub confidence: f64,
    pub probabilities: ProbabilityMap,
}

/// One entry of a batch result. Carries no probability map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub text: String,
    pub label: String,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProbabilityMap {
        ProbabilityMap::new(vec![
            ("Pertanyaan".into(), 0.95),
            ("Konsep Fisika".into(), 0.03),
            ("Penelitian".into(), 0.02),
        ])
    }

    #[test]
    fn lookup_by_label() {
        let map = sample();
        assert_eq!(map.get("Konsep Fisika"), Some(0.03));
        assert_eq!(map.get("Lainnya"), None);
        assert_eq!(map.len(), 3);
        assert!((map.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn serializes_as_object_in_label_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"Pertanyaan":0.95,"Konsep Fisika":0.03,"Penelitian":0.02}"#
        );
    }

    #[test]
    fn deserialize_keeps_document_order() {
        let json = r#"{"b": 0.25, "a": 0.75}"#;
        let map: ProbabilityMap = serde_json::from_str(json).unwrap();
        let labels: Vec<&str> = map.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn deserialize_rejects_non_numeric_probability() {
        let json = r#"{"a": "high"}"#;
        assert!(serde_json::from_str::<ProbabilityMap>(json).is_err());
    }
}
