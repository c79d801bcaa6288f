use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MattermostError;

/// A user row, projected to the nine fields of [`super::schema::USER_SCHEMA`].
///
/// Every other field of the remote user object is dropped on deserialization.
/// Absent fields serialize as `null` so every row carries the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub position: Option<String>,
    pub roles: Option<String>,
    pub locale: Option<String>,
}

impl User {
    /// Project one element of the `/users` response.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the element is not a user object or its `id` is empty.
    pub fn from_remote(value: Value) -> Result<Self, MattermostError> {
        let user: User = serde_json::from_value(value)
            .map_err(|e| MattermostError::ParseError(format!("user record: {e}")))?;
        if user.id.is_empty() {
            return Err(MattermostError::ParseError(
                "user record has an empty id".to_string(),
            ));
        }
        Ok(user)
    }
}

/// A channel object forwarded exactly as Mattermost returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(Map<String, Value>);

/// A team object forwarded exactly as Mattermost returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(Map<String, Value>);

macro_rules! pass_through_record {
    ($ty:ident, $kind:literal) => {
        impl $ty {
            /// # Errors
            ///
            /// Returns `ParseError` unless `value` is an object with a non-empty string `id`.
            pub fn from_remote(value: Value) -> Result<Self, MattermostError> {
                pass_through(value, $kind).map($ty)
            }

            #[must_use]
            pub fn id(&self) -> &str {
                str_field(&self.0, "id").unwrap_or_default()
            }

            #[must_use]
            pub fn display_name(&self) -> Option<&str> {
                str_field(&self.0, "display_name")
            }

            #[must_use]
            pub fn name(&self) -> Option<&str> {
                str_field(&self.0, "name")
            }

            #[must_use]
            pub fn created_at(&self) -> Option<DateTime<Utc>> {
                millis_field(&self.0, "create_at")
            }

            #[must_use]
            pub fn fields(&self) -> &Map<String, Value> {
                &self.0
            }

            #[must_use]
            pub fn into_fields(self) -> Map<String, Value> {
                self.0
            }
        }
    };
}

pass_through_record!(Channel, "channel");
pass_through_record!(Team, "team");

impl Channel {
    #[must_use]
    pub fn team_id(&self) -> Option<&str> {
        str_field(&self.0, "team_id")
    }

    #[must_use]
    pub fn last_post_at(&self) -> Option<DateTime<Utc>> {
        millis_field(&self.0, "last_post_at")
    }
}

impl Team {
    #[must_use]
    pub fn allow_open_invite(&self) -> Option<bool> {
        self.0.get("allow_open_invite").and_then(Value::as_bool)
    }
}

/// Envelope a sync-table formula hands back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult<T> {
    pub result: Vec<T>,
}

impl<T> SyncResult<T> {
    #[must_use]
    pub fn new(result: Vec<T>) -> Self {
        Self { result }
    }
}

fn pass_through(value: Value, kind: &str) -> Result<Map<String, Value>, MattermostError> {
    let Value::Object(fields) = value else {
        return Err(MattermostError::ParseError(format!(
            "{kind} record is not a JSON object"
        )));
    };
    if str_field(&fields, "id").is_none_or(str::is_empty) {
        return Err(MattermostError::ParseError(format!(
            "{kind} record has a missing or empty id"
        )));
    }
    Ok(fields)
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Mattermost timestamps are milliseconds since the epoch; `0` means unset.
fn millis_field(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    fields
        .get(key)
        .and_then(Value::as_i64)
        .filter(|ms| *ms > 0)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_projection_drops_extra_fields() {
        let user = User::from_remote(json!({
            "id": "u1",
            "username": "ada",
            "auth_service": "",
            "props": {"x": 1},
            "locale": "en"
        }))
        .unwrap();

        let v = serde_json::to_value(&user).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "username",
                "email",
                "first_name",
                "last_name",
                "nickname",
                "position",
                "roles",
                "locale"
            ]
        );
        assert_eq!(v["email"], Value::Null);
        assert_eq!(v["locale"], "en");
    }

    #[test]
    fn test_user_requires_id() {
        assert!(User::from_remote(json!({"username": "ada"})).is_err());
        assert!(User::from_remote(json!({"id": ""})).is_err());
        assert!(User::from_remote(json!("u1")).is_err());
    }

    #[test]
    fn test_channel_accessors() {
        let channel = Channel::from_remote(json!({
            "id": "c1",
            "team_id": "t1",
            "display_name": "Town Square",
            "name": "town-square",
            "create_at": 1_677_086_935_435_i64,
            "last_post_at": 0
        }))
        .unwrap();

        assert_eq!(channel.id(), "c1");
        assert_eq!(channel.team_id(), Some("t1"));
        assert_eq!(channel.display_name(), Some("Town Square"));
        assert_eq!(channel.name(), Some("town-square"));
        assert_eq!(
            channel.created_at().map(|t| t.timestamp_millis()),
            Some(1_677_086_935_435)
        );
        assert!(channel.last_post_at().is_none());
    }

    #[test]
    fn test_pass_through_rejects_missing_id() {
        let err = Team::from_remote(json!({"display_name": "Core"})).unwrap_err();
        assert!(matches!(err, MattermostError::ParseError(msg) if msg.contains("team")));
        assert!(Channel::from_remote(json!({"id": 5})).is_err());
        assert!(Channel::from_remote(json!([])).is_err());
    }

    #[test]
    fn test_team_allow_open_invite() {
        let team = Team::from_remote(json!({"id": "t1", "allow_open_invite": true})).unwrap();
        assert_eq!(team.allow_open_invite(), Some(true));
    }
}
