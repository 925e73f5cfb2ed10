use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Column width of `users.user_name`.
pub const MAX_USER_NAME_LEN: usize = 50;

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub user_name: Option<String>,
}

impl UserPayload {
    /// The name exactly as sent, or `Malformed` when missing, blank or too long.
    pub fn validated_name(self) -> Result<String, ApiError> {
        let name = self
            .user_name
            .ok_or_else(|| ApiError::Malformed("user_name is required".into()))?;
        if name.trim().is_empty() {
            return Err(ApiError::Malformed("user_name must not be empty".into()));
        }
        if name.chars().count() > MAX_USER_NAME_LEN {
            return Err(ApiError::Malformed(format!(
                "user_name longer than {MAX_USER_NAME_LEN} characters"
            )));
        }
        Ok(name)
    }
}

pub fn parse_user_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::Malformed(format!("invalid user id '{raw}'")))
}

#[derive(Debug, Serialize)]
pub struct UserFetched {
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "User_name")]
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct UserAdded {
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "User_added")]
    pub user_added: String,
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct UserUpdated {
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "User_updated")]
    pub user_updated: String,
}

#[derive(Debug, Serialize)]
pub struct UserDeleted {
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "User_deleted")]
    pub user_deleted: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>) -> UserPayload {
        UserPayload {
            user_name: name.map(str::to_string),
        }
    }

    #[test]
    fn name_is_kept_as_sent() {
        assert_eq!(payload(Some("  John ")).validated_name().unwrap(), "  John ");
    }

    #[test]
    fn missing_blank_or_long_names_are_malformed() {
        assert!(matches!(payload(None).validated_name(), Err(ApiError::Malformed(_))));
        assert!(matches!(payload(Some("   ")).validated_name(), Err(ApiError::Malformed(_))));
        let long = "x".repeat(MAX_USER_NAME_LEN + 1);
        assert!(matches!(payload(Some(&long)).validated_name(), Err(ApiError::Malformed(_))));
        let exact = "é".repeat(MAX_USER_NAME_LEN);
        assert!(payload(Some(&exact)).validated_name().is_ok());
    }

    #[test]
    fn user_id_parsing() {
        assert_eq!(parse_user_id("2").unwrap(), 2);
        assert_eq!(parse_user_id("-4").unwrap(), -4);
        assert!(matches!(parse_user_id("abc"), Err(ApiError::Malformed(_))));
        assert!(matches!(parse_user_id("99999999999"), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn success_bodies_use_wire_names() {
        let json = serde_json::to_value(UserAdded {
            status: "OK",
            user_added: "Anamim".into(),
            user_id: 3,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"Status": "OK", "User_added": "Anamim", "user_id": 3}));

        let json = serde_json::to_value(UserDeleted {
            status: "OK",
            user_deleted: "3".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"Status": "OK", "User_deleted": "3"}));
    }
}
