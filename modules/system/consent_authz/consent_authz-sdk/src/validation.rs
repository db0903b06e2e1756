//! Structural validation of a consent grant model.
//!
//! Works on raw JSON because the model is read back from session storage,
//! where anything may have been written. Expected shape:
//!
//! ```text
//! {
//!   "all":   { "read": bool, "write": bool, "delete": bool },
//!   "study": { "<study_id>": { "read": bool, "write": bool, "delete": bool }, ... }
//! }
//! ```
//!
//! Extra boolean-valued keys inside an action set are tolerated.

use serde_json::Value;

use crate::models::Action;

/// Why a grant model failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantModelError {
    #[error("consent grants must be a JSON object")]
    NotAnObject,

    #[error("consent grants are missing the `{0}` key")]
    MissingKey(&'static str),

    #[error("`study` must be an object keyed by study id")]
    StudyNotAnObject,

    #[error("grants for `{scope}` must be an object")]
    ActionSetNotAnObject { scope: String },

    #[error("grants for `{scope}` are missing the `{action}` action")]
    MissingAction { scope: String, action: Action },

    #[error("grants for `{scope}` have a non-boolean value under `{key}`")]
    NonBooleanValue { scope: String, key: String },
}

/// Validate the shape of a grant model.
///
/// # Errors
///
/// Returns the first [`GrantModelError`] found.
pub fn validate_consent_grant_model(model: &Value) -> Result<(), GrantModelError> {
    let Value::Object(root) = model else {
        return Err(GrantModelError::NotAnObject);
    };

    let all = root.get("all").ok_or(GrantModelError::MissingKey("all"))?;
    let study = root
        .get("study")
        .ok_or(GrantModelError::MissingKey("study"))?;

    check_action_set("all", all)?;

    let Value::Object(studies) = study else {
        return Err(GrantModelError::StudyNotAnObject);
    };
    for (study_id, grants) in studies {
        check_action_set(study_id, grants)?;
    }

    Ok(())
}

/// Predicate form of [`validate_consent_grant_model`]. Never panics.
#[must_use]
pub fn is_valid_consent_grant_model(model: &Value) -> bool {
    validate_consent_grant_model(model).is_ok()
}

fn check_action_set(scope: &str, grants: &Value) -> Result<(), GrantModelError> {
    let Value::Object(grants) = grants else {
        return Err(GrantModelError::ActionSetNotAnObject {
            scope: scope.to_owned(),
        });
    };

    if let Some(action) = Action::ALL
        .into_iter()
        .find(|action| !grants.contains_key(action.as_str()))
    {
        return Err(GrantModelError::MissingAction {
            scope: scope.to_owned(),
            action,
        });
    }

    if let Some((key, _)) = grants.iter().find(|(_, value)| !value.is_boolean()) {
        return Err(GrantModelError::NonBooleanValue {
            scope: scope.to_owned(),
            key: key.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn none() -> Value {
        json!({"read": false, "write": false, "delete": false})
    }

    #[test]
    fn accepts_empty_study_map() {
        assert!(is_valid_consent_grant_model(
            &json!({"all": none(), "study": {}})
        ));
    }

    #[test]
    fn accepts_populated_study_map() {
        let model = json!({
            "all": none(),
            "study": {
                "SD-0": {"read": true, "write": false, "delete": false},
                "SD-1": {"read": true, "write": true, "delete": false}
            }
        });
        assert!(is_valid_consent_grant_model(&model));
    }

    #[test]
    fn rejects_non_object() {
        assert_eq!(
            validate_consent_grant_model(&json!([1, 2])),
            Err(GrantModelError::NotAnObject)
        );
        assert!(!is_valid_consent_grant_model(&Value::Null));
    }

    #[test]
    fn rejects_missing_all() {
        assert_eq!(
            validate_consent_grant_model(&json!({"study": {}})),
            Err(GrantModelError::MissingKey("all"))
        );
    }

    #[test]
    fn rejects_missing_study() {
        assert_eq!(
            validate_consent_grant_model(&json!({"all": none()})),
            Err(GrantModelError::MissingKey("study"))
        );
    }

    #[test]
    fn rejects_action_set_missing_a_key() {
        let model = json!({"all": {"read": true, "write": false}, "study": {}});
        assert_eq!(
            validate_consent_grant_model(&model),
            Err(GrantModelError::MissingAction {
                scope: "all".to_owned(),
                action: Action::Delete,
            })
        );
    }

    #[test]
    fn rejects_non_boolean_action_value() {
        let model = json!({
            "all": none(),
            "study": {"SD-0": {"read": "yes", "write": false, "delete": false}}
        });
        assert_eq!(
            validate_consent_grant_model(&model),
            Err(GrantModelError::NonBooleanValue {
                scope: "SD-0".to_owned(),
                key: "read".to_owned(),
            })
        );
    }

    #[test]
    fn rejects_study_that_is_not_a_map() {
        let model = json!({"all": none(), "study": []});
        assert_eq!(
            validate_consent_grant_model(&model),
            Err(GrantModelError::StudyNotAnObject)
        );
    }

    #[test]
    fn rejects_study_entry_that_is_not_an_object() {
        let model = json!({"all": none(), "study": {"SD-0": true}});
        assert!(matches!(
            validate_consent_grant_model(&model),
            Err(GrantModelError::ActionSetNotAnObject { .. })
        ));
    }

    #[test]
    fn tolerates_extra_boolean_keys() {
        let model = json!({
            "all": {"read": false, "write": false, "delete": false, "admin": true},
            "study": {}
        });
        assert!(is_valid_consent_grant_model(&model));
    }

    #[test]
    fn rejects_extra_non_boolean_keys() {
        let model = json!({
            "all": {"read": false, "write": false, "delete": false, "admin": 1},
            "study": {}
        });
        assert!(!is_valid_consent_grant_model(&model));
    }
}
