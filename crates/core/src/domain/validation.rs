//! Structural validation of customer payloads received from either directory.
//!
//! Both directories return untyped JSON. Nothing leaves an HTTP boundary until it has been narrowed
//! into a [`Customer`] here, and a rejection always says which check failed.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::domain::customer::{Customer, IdPolicy, RecordId};

const KNOWN_FIELDS: [&str; 5] = ["name", "activeAt", "arr", "teamMemberId", "id"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("field `{field}` is missing")]
    MissingField { field: &'static str },
    #[error("field `{field}` must be a {expected}")]
    WrongType { field: &'static str, expected: &'static str },
    #[error("teamMemberId[{position}] is not a number")]
    NonNumericTeamMember { position: usize },
    #[error("field `id` is required but missing")]
    MissingId,
    #[error("response body is not a JSON array")]
    NotASequence,
    #[error("element {index}: {reason}")]
    Element { index: usize, reason: Box<Rejection> },
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),
}

pub fn validate(input: &Value, id_policy: IdPolicy) -> Result<Customer, Rejection> {
    let Value::Object(fields) = input else {
        return Err(Rejection::NotAnObject);
    };

    let name = string_field(fields, "name")?;
    let active_at = string_field(fields, "activeAt")?;
    let arr = number_field(fields, "arr")?;
    let team_member_id = team_members(fields)?;

    let id = match id_policy {
        IdPolicy::Required => {
            Some(fields.get("id").cloned().map(RecordId).ok_or(Rejection::MissingId)?)
        }
        IdPolicy::Optional => None,
    };

    let extra = fields
        .iter()
        .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Customer { name, active_at, arr, team_member_id, id, extra })
}

/// All-or-nothing: one bad element rejects the whole page.
pub fn validate_sequence(input: &Value, id_policy: IdPolicy) -> Result<Vec<Customer>, Rejection> {
    let Value::Array(entries) = input else {
        return Err(Rejection::NotASequence);
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            validate(entry, id_policy)
                .map_err(|reason| Rejection::Element { index, reason: Box::new(reason) })
        })
        .collect()
}

fn string_field(fields: &Map<String, Value>, field: &'static str) -> Result<String, Rejection> {
    match fields.get(field) {
        None => Err(Rejection::MissingField { field }),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(Rejection::WrongType { field, expected: "string" }),
    }
}

fn number_field(fields: &Map<String, Value>, field: &'static str) -> Result<Number, Rejection> {
    match fields.get(field) {
        None => Err(Rejection::MissingField { field }),
        Some(Value::Number(value)) => Ok(value.clone()),
        Some(_) => Err(Rejection::WrongType { field, expected: "number" }),
    }
}

fn team_members(fields: &Map<String, Value>) -> Result<Vec<Number>, Rejection> {
    let field = "teamMemberId";
    let entries = match fields.get(field) {
        None => return Err(Rejection::MissingField { field }),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(Rejection::WrongType { field, expected: "array" }),
    };

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            Value::Number(member) => Ok(member.clone()),
            _ => Err(Rejection::NonNumericTeamMember { position }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{validate, validate_sequence, Rejection};
    use crate::domain::customer::{IdPolicy, RecordId};

    fn valid_record() -> Value {
        json!({
            "name": "Globex",
            "activeAt": "2023-11-20T10:00:00Z",
            "arr": 48000,
            "teamMemberId": [1, 2, 3],
        })
    }

    fn without(field: &str) -> Value {
        let mut record = valid_record();
        record.as_object_mut().expect("object").remove(field);
        record
    }

    fn with(field: &str, value: Value) -> Value {
        let mut record = valid_record();
        record.as_object_mut().expect("object").insert(field.to_string(), value);
        record
    }

    #[test]
    fn non_objects_are_rejected() {
        for input in [Value::Null, json!("Globex"), json!(12), json!([valid_record()])] {
            assert_eq!(validate(&input, IdPolicy::Optional), Err(Rejection::NotAnObject));
        }
    }

    #[test]
    fn missing_required_fields_are_rejected_under_both_policies() {
        for policy in [IdPolicy::Optional, IdPolicy::Required] {
            for field in ["name", "activeAt", "arr", "teamMemberId"] {
                let mut input = without(field);
                input.as_object_mut().expect("object").insert("id".to_string(), json!(9));

                assert_eq!(
                    validate(&input, policy),
                    Err(Rejection::MissingField { field }),
                    "{field} should be required"
                );
            }
        }
    }

    #[test]
    fn mistyped_fields_are_rejected() {
        assert_eq!(
            validate(&with("name", json!(5)), IdPolicy::Optional),
            Err(Rejection::WrongType { field: "name", expected: "string" })
        );
        assert_eq!(
            validate(&with("activeAt", json!(null)), IdPolicy::Optional),
            Err(Rejection::WrongType { field: "activeAt", expected: "string" })
        );
        assert_eq!(
            validate(&with("arr", json!("48000")), IdPolicy::Optional),
            Err(Rejection::WrongType { field: "arr", expected: "number" })
        );
        assert_eq!(
            validate(&with("teamMemberId", json!(1)), IdPolicy::Optional),
            Err(Rejection::WrongType { field: "teamMemberId", expected: "array" })
        );
    }

    #[test]
    fn non_numeric_team_member_is_rejected_under_both_policies() {
        let input = with("teamMemberId", json!([1, "2", 3]));
        let mut with_id = input.clone();
        with_id.as_object_mut().expect("object").insert("id".to_string(), json!(4));

        assert_eq!(
            validate(&input, IdPolicy::Optional),
            Err(Rejection::NonNumericTeamMember { position: 1 })
        );
        assert_eq!(
            validate(&with_id, IdPolicy::Required),
            Err(Rejection::NonNumericTeamMember { position: 1 })
        );
    }

    #[test]
    fn empty_team_list_is_accepted() {
        let customer = validate(&with("teamMemberId", json!([])), IdPolicy::Optional)
            .expect("empty team is still a sequence of numbers");
        assert!(customer.team_member_id.is_empty());
    }

    #[test]
    fn optional_policy_accepts_missing_id_and_drops_a_present_one() {
        let customer = validate(&valid_record(), IdPolicy::Optional).expect("valid without id");
        assert_eq!(customer.id, None);

        let customer =
            validate(&with("id", json!(77)), IdPolicy::Optional).expect("valid with id");
        assert_eq!(customer.id, None);
        assert!(!customer.extra.contains_key("id"));
    }

    #[test]
    fn required_policy_fails_only_when_id_is_absent() {
        assert_eq!(validate(&valid_record(), IdPolicy::Required), Err(Rejection::MissingId));

        for id in [json!(12), json!("c-12"), json!(null), json!({"nested": true})] {
            let customer =
                validate(&with("id", id.clone()), IdPolicy::Required).expect("any id type accepted");
            assert_eq!(customer.id, Some(RecordId(id)));
        }
    }

    #[test]
    fn unknown_fields_are_kept_opaquely() {
        let customer =
            validate(&with("segment", json!("smb")), IdPolicy::Optional).expect("valid");
        assert_eq!(customer.extra.get("segment"), Some(&json!("smb")));
        assert_eq!(customer.name, "Globex");
        assert_eq!(customer.arr, serde_json::Number::from(48000));
    }

    #[test]
    fn sequence_requires_an_array() {
        assert_eq!(
            validate_sequence(&valid_record(), IdPolicy::Optional),
            Err(Rejection::NotASequence)
        );
    }

    #[test]
    fn sequence_accepts_empty_and_fully_valid_arrays() {
        assert_eq!(validate_sequence(&json!([]), IdPolicy::Optional), Ok(Vec::new()));

        let input = json!([valid_record(), with("name", json!("Initech"))]);
        let customers = validate_sequence(&input, IdPolicy::Optional).expect("every element valid");
        let names: Vec<&str> = customers.iter().map(|customer| customer.name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Initech"]);
    }

    #[test]
    fn one_invalid_element_rejects_the_whole_sequence() {
        let input = json!([valid_record(), without("arr"), valid_record()]);

        assert_eq!(
            validate_sequence(&input, IdPolicy::Optional),
            Err(Rejection::Element {
                index: 1,
                reason: Box::new(Rejection::MissingField { field: "arr" }),
            })
        );
    }

    #[test]
    fn sequence_applies_the_id_policy_to_every_element() {
        let input = json!([with("id", json!(1)), valid_record()]);

        assert!(validate_sequence(&input, IdPolicy::Optional).is_ok());
        assert_eq!(
            validate_sequence(&input, IdPolicy::Required),
            Err(Rejection::Element { index: 1, reason: Box::new(Rejection::MissingId) })
        );
    }

    #[test]
    fn nested_rejection_renders_a_readable_message() {
        let rejection = Rejection::Element {
            index: 2,
            reason: Box::new(Rejection::NonNumericTeamMember { position: 0 }),
        };
        assert_eq!(rejection.to_string(), "element 2: teamMemberId[0] is not a number");
    }
}
