//! All Mattermost-specific functionality

pub mod client;
pub mod models;
pub mod schema;

pub use client::{MattermostClient, USERS_PAGE_SIZE, build_post_payload};
pub use models::{Channel, SyncResult, Team, User};
pub use schema::{CHANNEL_SCHEMA, ObjectSchema, PropertySchema, TEAM_SCHEMA, USER_SCHEMA, ValueType};
