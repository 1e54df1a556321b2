use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Role;

/// Profile of an authenticated user, as returned by a realm's login or
/// "who am I" collaborator.
///
/// The record is realm-specific and otherwise opaque; typed accessors cover
/// the fields the navigation guard consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(Map<String, Value>);

impl Principal {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Principal from a JSON value; only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Parse a persisted principal. `null` is a valid "absent" encoding.
    pub fn parse(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        serde_json::from_str::<Option<Self>>(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// True iff `key` holds the boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Nested object under `key`, if any.
    pub fn nested(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    pub fn role(&self) -> Option<Role> {
        self.str_field("role").map(|r| Role::new(r.to_string()))
    }

    pub fn display_name(&self) -> Option<&str> {
        ["name", "real_name", "username"]
            .into_iter()
            .filter_map(|key| self.str_field(key))
            .find(|name| !name.is_empty())
    }
}

impl From<Map<String, Value>> for Principal {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn principal(value: Value) -> Principal {
        Principal::from_value(value).expect("object")
    }

    #[test]
    fn parse_accepts_null_and_objects() {
        assert_eq!(Principal::parse("null").unwrap(), None);

        let parsed = Principal::parse(r#"{"id":7,"role":"teacher"}"#).unwrap().unwrap();
        assert_eq!(parsed.role().unwrap().as_str(), "teacher");
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(Principal::parse("[1,2]").is_err());
        assert!(Principal::parse("\"bob\"").is_err());
        assert!(Principal::parse("{not json").is_err());
    }

    #[test]
    fn flags_require_literal_true() {
        let p = principal(json!({
            "need_change_password": true,
            "truthy_number": 1,
            "truthy_string": "true",
        }));

        assert!(p.flag("need_change_password"));
        assert!(!p.flag("truthy_number"));
        assert!(!p.flag("truthy_string"));
        assert!(!p.flag("absent"));
    }

    #[test]
    fn display_name_falls_back_in_order() {
        let p = principal(json!({ "name": "", "real_name": "Li Wei", "username": "liwei" }));
        assert_eq!(p.display_name(), Some("Li Wei"));

        let p = principal(json!({ "username": "liwei" }));
        assert_eq!(p.display_name(), Some("liwei"));

        assert_eq!(Principal::default().display_name(), None);
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let p = principal(json!({ "id": 3, "school": { "school_code": "S01" } }));
        let restored = Principal::parse(&p.to_json().unwrap()).unwrap().unwrap();

        assert_eq!(restored, p);
        assert_eq!(
            restored.nested("school").and_then(|s| s.get("school_code")),
            Some(&json!("S01"))
        );
    }
}
