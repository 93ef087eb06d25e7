use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::models::{UserModel, UserPatch};
use crate::validation::present;

/// Request payload for PATCH /users. A `null` name clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
}

impl From<EditUserRequest> for UserPatch {
    fn from(request: EditUserRequest) -> Self {
        Self {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }
}

/// Public profile; the password hash is not part of it
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_user_response_has_no_hash() {
        let now = Utc::now();
        let response = UserResponse::from(UserModel {
            id: 7,
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.to_lowercase().contains("hash"));
        assert!(json.contains("\"firstName\":\"Ada\""));
    }

    #[rstest]
    #[case(r#"{"email": "new@email.com"}"#, true)]
    #[case(r#"{"firstName": "dmitri"}"#, true)]
    #[case(r#"{}"#, true)]
    #[case(r#"{"email": "invalid-email"}"#, false)]
    fn test_edit_user_rules(#[case] body: &str, #[case] valid: bool) {
        let request: EditUserRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.validate().is_ok(), valid);
    }

    #[rstest]
    #[case(r#"{"firstName": 323123}"#)]
    #[case(r#"{"lastName": 323123}"#)]
    fn test_edit_user_rejects_non_string_names(#[case] body: &str) {
        assert!(serde_json::from_str::<EditUserRequest>(body).is_err());
    }

    #[test]
    fn test_edit_user_null_clears_names() {
        let patch = UserPatch::from(
            serde_json::from_str::<EditUserRequest>(r#"{"firstName": null, "email": "a@b.com"}"#)
                .unwrap(),
        );
        assert_eq!(patch.first_name, Some(None));
        assert_eq!(patch.last_name, None);
        assert_eq!(patch.email.as_deref(), Some("a@b.com"));
    }
}
