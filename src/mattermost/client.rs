//! Mattermost API client module
//!
//! One method per pack operation. Each method issues exactly one request
//! through the injected [`Fetcher`] and reshapes the JSON it gets back.
//! Nothing is retried or cached.

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};
use url::Url;

use super::models::{Channel, Team, User};
use super::schema::{CHANNEL_SCHEMA, ObjectSchema, TEAM_SCHEMA};
use crate::core::config::PackConfig;
use crate::core::fetcher::{FetchRequest, FetchResponse, Fetcher};
use crate::errors::{MattermostError, require_non_empty};

/// Page size requested by the Users sync table.
pub const USERS_PAGE_SIZE: &str = "100";

/// Build the JSON body for `POST /api/v4/posts`.
#[must_use]
pub fn build_post_payload(channel_id: &str, message: &str) -> Value {
    json!({
        "channel_id": channel_id,
        "message": message,
    })
}

fn append_optional(url: &mut Url, pairs: &[(&str, Option<&str>)]) {
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
        if let Some(value) = value {
            query.append_pair(key, value);
        }
    }
    drop(query);
    // An empty `?` would otherwise be left behind when every value is absent.
    if url.query() == Some("") {
        url.set_query(None);
    }
}

pub struct MattermostClient<F> {
    config: PackConfig,
    fetcher: F,
}

impl<F: Fetcher> MattermostClient<F> {
    #[must_use]
    pub fn new(config: PackConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    #[must_use]
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, MattermostError> {
        if !self.config.permits(&request.url) {
            return Err(MattermostError::DomainNotAllowed(request.url.to_string()));
        }

        let method = request.method.clone();
        let url = request.url.clone();
        debug!("{} {}", method, url);

        let resp = self.fetcher.fetch(request).await?;
        if !resp.status.is_success() {
            warn!("{} {} returned HTTP {}", method, url, resp.status);
            return Err(MattermostError::StatusError {
                status: resp.status.as_u16(),
                body: resp.body,
            });
        }
        Ok(resp)
    }

    async fn fetch_json(&self, request: FetchRequest) -> Result<Value, MattermostError> {
        let resp = self.fetch(request).await?;
        serde_json::from_str(&resp.body).map_err(|e| {
            MattermostError::ParseError(format!("response body is not JSON: {e}"))
        })
    }

    async fn fetch_array(&self, request: FetchRequest) -> Result<Vec<Value>, MattermostError> {
        match self.fetch_json(request).await? {
            Value::Array(items) => Ok(items),
            other => Err(MattermostError::ParseError(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Post `message` to `channel_id` and return the created post as Mattermost sent it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for empty arguments, otherwise any transport,
    /// status, or parse error from the request.
    pub async fn send_message(
        &self,
        channel_id: &str,
        message: &str,
    ) -> Result<Value, MattermostError> {
        let channel_id = require_non_empty("channel_id", channel_id)?;
        let message = require_non_empty("message", message)?;

        let url = self.config.api_url(&["posts"])?;
        let payload = build_post_payload(channel_id, message);
        let post = self.fetch_json(FetchRequest::post_json(url, &payload)).await?;

        info!("Posted message to channel {}", channel_id);
        Ok(post)
    }

    /// Fetch one channel. The object is returned untouched; no schema applies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty id, `ParseError` if the body is
    /// not a JSON object, or any transport/status error.
    pub async fn get_channel(&self, channel_id: &str) -> Result<Map<String, Value>, MattermostError> {
        let channel_id = require_non_empty("channel_id", channel_id)?;

        let url = self.config.api_url(&["channels", channel_id])?;
        match self.fetch_json(FetchRequest::get(url)).await? {
            Value::Object(channel) => Ok(channel),
            other => Err(MattermostError::ParseError(format!(
                "expected a channel object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// List active users, optionally restricted to one team.
    ///
    /// Always asks for a single page of [`USERS_PAGE_SIZE`] users. `page` and
    /// `per_page` are accepted for parity with the other tables but are not sent.
    ///
    /// # Errors
    ///
    /// Returns any transport/status error, or `ParseError` if the body is not an
    /// array of user objects.
    pub async fn list_users(
        &self,
        team_id: Option<&str>,
        page: Option<&str>,
        per_page: Option<&str>,
    ) -> Result<Vec<User>, MattermostError> {
        if page.is_some() || per_page.is_some() {
            debug!("Users sync ignores page={:?} per_page={:?}", page, per_page);
        }

        let mut url = self.config.api_url(&["users"])?;
        append_optional(
            &mut url,
            &[
                ("in_team", team_id.filter(|t| !t.is_empty())),
                ("per_page", Some(USERS_PAGE_SIZE)),
                ("active", Some("true")),
            ],
        );

        let users = self
            .fetch_array(FetchRequest::get(url))
            .await?
            .into_iter()
            .map(User::from_remote)
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} users", users.len());
        Ok(users)
    }

    /// List the channels of `team_id`, forwarding pagination verbatim.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty team id, any transport/status
    /// error, or `ParseError` for a malformed body.
    pub async fn list_channels(
        &self,
        team_id: &str,
        page: Option<&str>,
        per_page: Option<&str>,
    ) -> Result<Vec<Channel>, MattermostError> {
        let team_id = require_non_empty("team_id", team_id)?;

        let mut url = self.config.api_url(&["teams", team_id, "channels"])?;
        append_optional(&mut url, &[("page", page), ("per_page", per_page)]);

        let channels = self
            .fetch_array(FetchRequest::get(url))
            .await?
            .into_iter()
            .map(|item| {
                hint_schema_mismatch(&CHANNEL_SCHEMA, "channel", &item);
                Channel::from_remote(item)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} channels for team {}", channels.len(), team_id);
        Ok(channels)
    }

    /// List teams, forwarding pagination verbatim.
    ///
    /// # Errors
    ///
    /// Returns any transport/status error, or `ParseError` for a malformed body.
    pub async fn list_teams(
        &self,
        page: Option<&str>,
        per_page: Option<&str>,
    ) -> Result<Vec<Team>, MattermostError> {
        let mut url = self.config.api_url(&["teams"])?;
        append_optional(&mut url, &[("page", page), ("per_page", per_page)]);

        let teams = self
            .fetch_array(FetchRequest::get(url))
            .await?
            .into_iter()
            .map(|item| {
                hint_schema_mismatch(&TEAM_SCHEMA, "team", &item);
                Team::from_remote(item)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} teams", teams.len());
        Ok(teams)
    }
}

fn hint_schema_mismatch(schema: &ObjectSchema, kind: &str, item: &Value) {
    if let Some(fields) = item.as_object() {
        let mismatched = schema.mismatched_properties(fields);
        if !mismatched.is_empty() {
            warn!("{} record has unexpected types for {:?}", kind, mismatched);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct UnreachableFetcher;

    #[async_trait]
    impl Fetcher for UnreachableFetcher {
        async fn fetch(&self, _request: FetchRequest) -> Result<FetchResponse, MattermostError> {
            Err(MattermostError::HttpError("fetch should not be reached".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fetch_refuses_foreign_domain() {
        let config = PackConfig::new("https://chat.example.com").unwrap();
        let client = MattermostClient::new(config, UnreachableFetcher);
        let url = Url::parse("https://attacker.example.net/api/v4/teams").unwrap();

        let err = client.fetch(FetchRequest::get(url)).await.unwrap_err();
        assert!(matches!(err, MattermostError::DomainNotAllowed(_)));
    }

    #[test]
    fn test_build_post_payload() {
        let payload = build_post_payload("c1", "**hello**");
        assert_eq!(payload, json!({"channel_id": "c1", "message": "**hello**"}));
    }

    #[test]
    fn test_append_optional_skips_absent_values() {
        let mut url = Url::parse("https://chat.example.com/api/v4/teams").unwrap();
        append_optional(&mut url, &[("page", None), ("per_page", Some("50"))]);
        assert_eq!(url.query(), Some("per_page=50"));
    }

    #[test]
    fn test_append_optional_all_absent_leaves_no_query() {
        let mut url = Url::parse("https://chat.example.com/api/v4/teams").unwrap();
        append_optional(&mut url, &[("page", None), ("per_page", None)]);
        assert_eq!(url.as_str(), "https://chat.example.com/api/v4/teams");
    }

    #[test]
    fn test_append_optional_encodes_values() {
        let mut url = Url::parse("https://chat.example.com/api/v4/users").unwrap();
        append_optional(&mut url, &[("in_team", Some("a&b"))]);
        assert_eq!(url.query(), Some("in_team=a%26b"));
    }
}
