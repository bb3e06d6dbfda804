use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Backends have been seen sending both string and numeric ids.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_and_numeric_ids() {
        let from_text: Category =
            serde_json::from_str(r#"{"id": "cat1", "name": "Reports"}"#).expect("string id");
        assert_eq!(from_text.id, "cat1");

        let from_number: Category =
            serde_json::from_str(r#"{"id": 7, "name": "Reports"}"#).expect("numeric id");
        assert_eq!(from_number.id, "7");
    }
}
