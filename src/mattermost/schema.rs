//! Record shapes declared to the host platform.
//!
//! The host uses these to type and lay out sync-table columns. Only the
//! User table is projected onto its schema; Channel and Team rows are
//! forwarded as returned and the schema stays a display hint.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    String,
    Number,
    Boolean,
}

impl ValueType {
    /// Whether `value` fits this scalar type. `null` fits every type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ValueType::String, Value::String(_)) => true,
            (ValueType::Number, Value::Number(_)) => true,
            (ValueType::Boolean, Value::Bool(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    pub id_property: &'static str,
    pub display_property: &'static str,
    pub featured_properties: &'static [&'static str],
    pub properties: &'static [PropertySchema],
}

impl ObjectSchema {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(|p| p.name)
    }

    /// Declared properties present in `record` with a value of the wrong type.
    #[must_use]
    pub fn mismatched_properties(&self, record: &Map<String, Value>) -> Vec<&'static str> {
        self.properties
            .iter()
            .filter(|p| {
                record
                    .get(p.name)
                    .is_some_and(|value| !p.value_type.accepts(value))
            })
            .map(|p| p.name)
            .collect()
    }
}

const fn prop(name: &'static str, value_type: ValueType, description: &'static str) -> PropertySchema {
    PropertySchema {
        name,
        value_type,
        description,
    }
}

pub static USER_SCHEMA: ObjectSchema = ObjectSchema {
    id_property: "id",
    display_property: "username",
    featured_properties: &[
        "id",
        "username",
        "email",
        "first_name",
        "last_name",
        "nickname",
        "position",
    ],
    properties: &[
        prop("id", ValueType::String, "User ID"),
        prop("username", ValueType::String, "Username"),
        prop("email", ValueType::String, "Email"),
        prop("first_name", ValueType::String, "First name"),
        prop("last_name", ValueType::String, "Last name"),
        prop("nickname", ValueType::String, "Nickname"),
        prop("position", ValueType::String, "Position"),
        prop("roles", ValueType::String, "Roles"),
        prop("locale", ValueType::String, "Locale"),
    ],
};

pub static CHANNEL_SCHEMA: ObjectSchema = ObjectSchema {
    id_property: "id",
    display_property: "display_name",
    featured_properties: &[
        "id",
        "display_name",
        "name",
        "header",
        "purpose",
        "total_msg_count",
    ],
    properties: &[
        prop("id", ValueType::String, "Channel ID"),
        prop("create_at", ValueType::Number, "Create at"),
        prop("update_at", ValueType::Number, "Update at"),
        prop("delete_at", ValueType::Number, "Delete at"),
        prop("team_id", ValueType::String, "Team ID"),
        prop("type", ValueType::String, "Type"),
        prop("display_name", ValueType::String, "Display name"),
        prop("name", ValueType::String, "Name"),
        prop("header", ValueType::String, "Header"),
        prop("purpose", ValueType::String, "Purpose"),
        prop("last_post_at", ValueType::Number, "Last post at"),
        prop("total_msg_count", ValueType::Number, "Total message count"),
        prop("extra_update_at", ValueType::Number, "Extra update at"),
        prop("creator_id", ValueType::String, "Creator ID"),
    ],
};

pub static TEAM_SCHEMA: ObjectSchema = ObjectSchema {
    id_property: "id",
    display_property: "display_name",
    featured_properties: &["id", "display_name", "name", "description", "email"],
    properties: &[
        prop("id", ValueType::String, "Team ID"),
        prop("create_at", ValueType::Number, "Create at"),
        prop("update_at", ValueType::Number, "Update at"),
        prop("delete_at", ValueType::Number, "Delete at"),
        prop("display_name", ValueType::String, "Display name"),
        prop("name", ValueType::String, "Name"),
        prop("description", ValueType::String, "Description"),
        prop("email", ValueType::String, "Email"),
        prop("type", ValueType::String, "Type"),
        prop("allowed_domains", ValueType::String, "Allowed domains"),
        prop("invite_id", ValueType::String, "Invite ID"),
        prop("allow_open_invite", ValueType::Boolean, "Allow open invite"),
        prop("policy_id", ValueType::String, "Policy ID"),
    ],
};
