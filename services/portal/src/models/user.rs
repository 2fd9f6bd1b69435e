//! User model and authentication payloads

use serde::{Deserialize, Serialize};

/// Account role as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Student,
    Alumni,
    Admin,
    /// Any other role, kept verbatim
    Other(String),
}

impl Role {
    /// Get the role as sent over the wire
    pub fn as_str(&self) -> &str {
        match self {
            Role::Student => "STUDENT",
            Role::Alumni => "ALUMNI",
            Role::Admin => "ADMIN",
            Role::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "STUDENT" => Role::Student,
            "ALUMNI" => Role::Alumni,
            "ADMIN" => Role::Admin,
            _ => Role::Other(role),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

/// Snapshot of the signed-in user, cached at login time
///
/// Only `username` is guaranteed; every other field is omitted from the
/// cached JSON when the backend did not send it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owes_fees: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::deserialize_optional_amount"
    )]
    pub total_debt: Option<f64>,
}

impl UserProfile {
    /// Profile holding only a username
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Downloads are allowed only when no fee flag is set and no debt is recorded
    pub fn can_download(&self) -> bool {
        let owes_fees = self.owes_fees.unwrap_or(false);
        let has_debt = self.total_debt.is_some_and(|debt| debt != 0.0);
        !owes_fees && !has_debt
    }

    /// Outstanding debt worth showing, if any
    pub fn outstanding_debt(&self) -> Option<f64> {
        self.total_debt.filter(|debt| *debt > 0.0)
    }

    /// Name used in greetings: first name when known, otherwise the username
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(first) if !first.trim().is_empty() => first,
            _ => &self.username,
        }
    }
}

/// Token pair issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

/// Response of the login and register endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(default)]
    pub tokens: Option<AuthTokens>,
}

/// Request for user login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request for alumni registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<i32>,
}

impl ProfileUpdate {
    /// True when the update would not change anything
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_profile_round_trips_without_extra_fields() {
        let user: UserProfile = serde_json::from_value(json!({"username": "abc"})).unwrap();
        assert_eq!(user, UserProfile::named("abc"));
        assert_eq!(serde_json::to_value(&user).unwrap(), json!({"username": "abc"}));
    }

    #[test]
    fn test_can_download_truth_table() {
        let mut user = UserProfile::named("abc");
        assert!(user.can_download());

        user.owes_fees = Some(false);
        user.total_debt = Some(0.0);
        assert!(user.can_download());

        user.owes_fees = Some(true);
        assert!(!user.can_download());

        user.owes_fees = None;
        user.total_debt = Some(150.0);
        assert!(!user.can_download());

        user.total_debt = Some(-5.0);
        assert!(!user.can_download());
    }

    #[test]
    fn test_total_debt_accepts_decimal_strings() {
        let user: UserProfile =
            serde_json::from_value(json!({"username": "abc", "total_debt": "150.50"})).unwrap();
        assert_eq!(user.total_debt, Some(150.5));
        assert_eq!(user.outstanding_debt(), Some(150.5));

        let user: UserProfile =
            serde_json::from_value(json!({"username": "abc", "total_debt": "0.00"})).unwrap();
        assert!(user.can_download());
        assert_eq!(user.outstanding_debt(), None);
    }

    #[test]
    fn test_unknown_role_is_kept_verbatim() {
        let user: UserProfile =
            serde_json::from_value(json!({"username": "abc", "role": "STAFF"})).unwrap();
        assert_eq!(user.role, Some(Role::Other("STAFF".to_string())));

        let cached = serde_json::to_string(&user).unwrap();
        let restored: UserProfile = serde_json::from_str(&cached).unwrap();
        assert_eq!(restored, user);
        assert_eq!(serde_json::to_value(&restored).unwrap()["role"], "STAFF");
    }

    #[test]
    fn test_known_roles_use_uppercase_tags() {
        assert_eq!(serde_json::to_value(Role::Alumni).unwrap(), json!("ALUMNI"));
        let role: Role = serde_json::from_value(json!("STUDENT")).unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_display_name_prefers_first_name() {
        let mut user = UserProfile::named("jdoe");
        assert_eq!(user.display_name(), "jdoe");
        user.first_name = Some(" ".to_string());
        assert_eq!(user.display_name(), "jdoe");
        user.first_name = Some("Jane".to_string());
        assert_eq!(user.display_name(), "Jane");
    }

    #[test]
    fn test_auth_response_without_tokens() {
        let response: AuthResponse =
            serde_json::from_value(json!({"user": {"username": "abc"}})).unwrap();
        assert!(response.tokens.is_none());
    }
}
