//! Typed view of the completed-job result payload.
//!
//! The backend assembles this object from loosely-shaped analysis output, so
//! every field is optional and decoded leniently: a field with an unexpected
//! JSON type is treated as absent rather than failing the whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResultPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub topic_info: Option<TopicInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub q_set: Option<Vec<ItemEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub personas: Option<Vec<PersonaEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub factor_stats: Option<FactorStats>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub consensus_items: Option<Vec<ConsensusEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub types: Option<Vec<TypeEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub report_path: Option<String>,
}

impl ResultPayload {
    /// Decode a raw JSON result. Anything that is not an object yields the
    /// empty payload.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TopicInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub final_topic: Option<String>,
    /// The topic as originally submitted.
    #[serde(default, deserialize_with = "lenient")]
    pub topic: Option<String>,
}

/// A Q-set statement: either bare text or `{ id, text }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemEntry {
    Text(String),
    Structured(StructuredItem),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StructuredItem {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

/// A participant persona: either a plain name or a profile object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PersonaEntry {
    Name(String),
    Profile(PersonaProfile),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PersonaProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Number or free text ("30대").
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub brief: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub brief_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FactorStats {
    #[serde(default, deserialize_with = "lenient")]
    pub n_factors: Option<usize>,
    #[serde(default, deserialize_with = "lenient_slots")]
    pub eigenvalues: Option<Vec<Option<f64>>>,
    /// Per-factor proportion of variance, as a fraction.
    #[serde(default, deserialize_with = "lenient_slots")]
    pub explained_variance: Option<Vec<Option<f64>>>,
    /// Cumulative proportion of variance, as a fraction.
    #[serde(default, deserialize_with = "lenient_slots")]
    pub cumulative_variance: Option<Vec<Option<f64>>>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConsensusEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub statement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub avg_z_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub interpretation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TypeEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub factor: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub polarity: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bias: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub core_values: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub survival_instinct: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub defense_mechanism: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hidden_fear: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub self_justification: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub trigger_phrases: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub action_plan: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_statements: Option<Vec<KeyStatement>>,
    /// Positional: entry `i` pairs with `defining_scores[i]`.
    #[serde(default, deserialize_with = "lenient_slots")]
    pub defining_statements: Option<Vec<Option<String>>>,
    /// Kept raw: a non-numeric score renders as "N/A" instead of dropping the item.
    #[serde(default, deserialize_with = "lenient")]
    pub defining_scores: Option<Vec<Value>>,
}

impl TypeEntry {
    /// `polarity` wins over the older `bias` field.
    pub fn polarity(&self) -> Option<&str> {
        self.polarity.as_deref().or(self.bias.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct KeyStatement {
    #[serde(default, deserialize_with = "lenient")]
    pub statement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default)]
    pub z_score: Option<Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], but for arrays: malformed elements are skipped instead of
/// discarding the whole list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Like [`lenient_list`], but a malformed element becomes `None` in place so
/// parallel arrays stay index-aligned.
fn lenient_slots<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_field_types_decode_as_absent() {
        let payload = ResultPayload::from_value(json!({
            "topic_info": "not an object",
            "factor_stats": { "eigenvalues": "2.1, 1.3", "total_variance": 0.61 },
            "types": [ { "type_name": "A" }, 42, { "type_name": "B" } ]
        }));

        assert_eq!(payload.topic_info, None);
        let stats = payload.factor_stats.unwrap();
        assert_eq!(stats.eigenvalues, None);
        assert_eq!(stats.total_variance, Some(0.61));
        let names: Vec<_> = payload
            .types
            .unwrap()
            .into_iter()
            .map(|t| t.type_name.unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn bad_list_elements_keep_their_neighbours() {
        let payload = ResultPayload::from_value(json!({
            "factor_stats": { "eigenvalues": [2.1, null, "x", 1.3] },
            "types": [{
                "core_values": ["a", null, 3, "b"],
                "defining_statements": ["s1", null, "s3"]
            }]
        }));

        let stats = payload.factor_stats.unwrap();
        assert_eq!(stats.eigenvalues, Some(vec![Some(2.1), None, None, Some(1.3)]));
        let entry = &payload.types.unwrap()[0];
        assert_eq!(entry.core_values, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(
            entry.defining_statements,
            Some(vec![Some("s1".to_string()), None, Some("s3".to_string())])
        );
    }

    #[test]
    fn non_object_payload_is_empty() {
        assert_eq!(ResultPayload::from_value(json!([1, 2])), ResultPayload::default());
        assert_eq!(ResultPayload::from_value(Value::Null), ResultPayload::default());
    }

    #[test]
    fn mixed_item_and_persona_shapes() {
        let payload = ResultPayload::from_value(json!({
            "q_set": ["plain", { "id": 2, "text": "structured" }],
            "personas": ["김민수", { "name": "이지은", "age": 29 }]
        }));

        let items = payload.q_set.unwrap();
        assert_eq!(items[0], ItemEntry::Text("plain".into()));
        assert!(matches!(&items[1], ItemEntry::Structured(s) if s.text.as_deref() == Some("structured")));

        let personas = payload.personas.unwrap();
        assert_eq!(personas[0], PersonaEntry::Name("김민수".into()));
        assert!(matches!(&personas[1], PersonaEntry::Profile(p) if p.age == Some(json!(29))));
    }

    #[test]
    fn bias_is_used_when_polarity_is_missing() {
        let entry: TypeEntry = serde_json::from_value(json!({ "bias": "negative" })).unwrap();
        assert_eq!(entry.polarity(), Some("negative"));
    }
}
