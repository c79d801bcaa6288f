use std::sync::Mutex;

use async_trait::async_trait;
use mattermost_pack::core::{FetchRequest, FetchResponse, Fetcher, PackConfig};
use mattermost_pack::errors::MattermostError;
use mattermost_pack::mattermost::MattermostClient;
use mattermost_pack::pack::{self, PackDefinition};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

/// Answers every request with one canned response and remembers what it was asked.
struct RecordingFetcher {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<FetchRequest>>,
}

impl RecordingFetcher {
    fn new(status: u16, body: &Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, MattermostError> {
        self.requests.lock().unwrap().push(request);
        Ok(FetchResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

fn setup(status: u16, body: &Value) -> (PackDefinition, MattermostClient<RecordingFetcher>) {
    let config = PackConfig::new("https://chat.example.com").unwrap();
    let definition = pack::definition(&config);
    let client = MattermostClient::new(config, RecordingFetcher::new(status, body));
    (definition, client)
}

fn args(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

#[tokio::test]
async fn test_channel_formula_returns_display_name() {
    let (definition, client) = setup(
        200,
        &json!({
            "id": "p7ndqtybwinaib83cnj6of599e",
            "create_at": 1_677_086_935_435_i64,
            "team_id": "qkne79cexidqdc7taf5ompajma",
            "type": "O",
            "display_name": "Town Square",
            "name": "town-square",
            "scheme_id": null,
            "props": null,
            "total_msg_count_root": 2
        }),
    );

    let result = definition
        .execute_formula(&client, "Channel", &args(&[Some("p7ndqtybwinaib83cnj6of599e")]))
        .await
        .unwrap();

    assert_eq!(result["display_name"], "Town Square");
    let requests = client.fetcher().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(
        requests[0].url.as_str(),
        "https://chat.example.com/api/v4/channels/p7ndqtybwinaib83cnj6of599e"
    );
}

#[tokio::test]
async fn test_post_message_formula_sends_one_post_and_returns_string() {
    let created = json!({"id": "post1", "channel_id": "c1", "message": "Hello"});
    let (definition, client) = setup(201, &created);

    let result = definition
        .execute_formula(&client, "PostMessage", &args(&[Some("c1"), Some("Hello")]))
        .await
        .unwrap();

    let Value::String(raw) = result else {
        panic!("PostMessage should return a string");
    };
    assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), created);

    let requests = client.fetcher().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url.path(), "/api/v4/posts");
    let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"channel_id": "c1", "message": "Hello"}));
}

#[tokio::test]
async fn test_post_message_missing_argument_makes_no_request() {
    let (definition, client) = setup(201, &json!({}));

    let err = definition
        .execute_formula(&client, "PostMessage", &args(&[Some("c1")]))
        .await
        .unwrap_err();

    assert!(matches!(err, MattermostError::InvalidParameter { .. }));
    assert!(client.fetcher().requests().is_empty());
}

#[tokio::test]
async fn test_unknown_formula() {
    let (definition, client) = setup(200, &json!({}));

    let err = definition
        .execute_formula(&client, "DeleteChannel", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, MattermostError::UnknownFormula(name) if name == "DeleteChannel"));

    let err = definition
        .execute_sync(&client, "Posts", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, MattermostError::UnknownFormula(_)));
}

#[tokio::test]
async fn test_users_sync_rows_have_schema_fields_only() {
    let (definition, client) = setup(
        200,
        &json!([
            {"id": "u1", "username": "ada", "props": {}, "is_bot": false},
            {"id": "u2", "username": "grace", "email": "grace@example.com"}
        ]),
    );

    let synced = definition
        .execute_sync(&client, "Users", &args(&[Some("t1")]))
        .await
        .unwrap();

    assert_eq!(synced.result.len(), 2);
    assert_eq!(synced.result[0]["username"], "ada");
    assert_eq!(synced.result[1]["email"], "grace@example.com");
    for row in &synced.result {
        let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        let declared: Vec<&str> = pack::definition(client.config())
            .sync_table("Users")
            .unwrap()
            .schema
            .property_names()
            .collect();
        assert_eq!(keys, declared);
    }

    let requests = client.fetcher().requests();
    assert_eq!(requests[0].url.query(), Some("in_team=t1&per_page=100&active=true"));
}

#[tokio::test]
async fn test_channels_sync_applies_default_page_size() {
    let remote = json!([{"id": "c1", "display_name": "Town Square", "scheme_id": null}]);
    let (definition, client) = setup(200, &remote);

    let synced = definition
        .execute_sync(&client, "SyncChannels", &args(&[Some("t1")]))
        .await
        .unwrap();

    assert_eq!(Value::Array(synced.result), remote);
    let requests = client.fetcher().requests();
    assert_eq!(requests[0].url.path(), "/api/v4/teams/t1/channels");
    assert_eq!(requests[0].url.query(), Some("per_page=100"));
}

#[tokio::test]
async fn test_channels_sync_requires_team_id() {
    let (definition, client) = setup(200, &json!([]));

    let err = definition
        .execute_sync(&client, "Channels", &args(&[None, Some("0")]))
        .await
        .unwrap_err();

    assert!(matches!(err, MattermostError::InvalidParameter { ref name, .. } if name == "team_id"));
    assert!(client.fetcher().requests().is_empty());
}

#[tokio::test]
async fn test_teams_sync_forwards_pagination() {
    let (definition, client) = setup(200, &json!([{"id": "t1", "display_name": "Core"}]));

    let synced = definition
        .execute_sync(&client, "Teams", &args(&[Some("2"), Some("10")]))
        .await
        .unwrap();

    assert_eq!(synced.result[0]["display_name"], "Core");
    let requests = client.fetcher().requests();
    assert_eq!(requests[0].url.query(), Some("page=2&per_page=10"));
}

#[tokio::test]
async fn test_sync_surfaces_non_success_status() {
    let (definition, client) = setup(401, &json!({"message": "Invalid or expired session"}));

    let err = definition
        .execute_sync(&client, "Teams", &[])
        .await
        .unwrap_err();

    match err {
        MattermostError::StatusError { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("expired session"));
        }
        other => panic!("Expected StatusError, got: {other:?}"),
    }
}
