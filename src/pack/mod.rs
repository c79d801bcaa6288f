//! The surface the host platform sees: formulas, sync tables, and how
//! host arguments reach the Mattermost client.

pub mod parameters;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::core::config::PackConfig;
use crate::core::fetcher::Fetcher;
use crate::errors::MattermostError;
use crate::mattermost::schema::{CHANNEL_SCHEMA, ObjectSchema, TEAM_SCHEMA, USER_SCHEMA};
use crate::mattermost::{MattermostClient, SyncResult};

pub use parameters::{Arguments, ParameterDef, ParameterType};

pub const POST_MESSAGE: &str = "PostMessage";
pub const CHANNEL: &str = "Channel";
pub const USERS_TABLE: &str = "Users";
pub const CHANNELS_TABLE: &str = "Channels";
pub const TEAMS_TABLE: &str = "Teams";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultType {
    String,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaDef {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterDef>,
    pub is_action: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<ResultType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ObjectSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTableDef {
    pub name: &'static str,
    pub identity_name: &'static str,
    pub schema: ObjectSchema,
    pub formula: FormulaDef,
}

/// OAuth2 authorization-code settings; the host runs the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAuthentication {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub authorization_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDefinition {
    pub network_domains: Vec<String>,
    pub user_authentication: UserAuthentication,
    pub formulas: Vec<FormulaDef>,
    pub sync_tables: Vec<SyncTableDef>,
}

fn pagination_parameters(noun: &'static str, suggest_page_size: bool) -> [ParameterDef; 2] {
    let (page_description, per_page_description) = match noun {
        "users" => (
            "the page number to list users from",
            "the number of users per page",
        ),
        "channels" => (
            "the page number to list channels from",
            "the number of channels per page",
        ),
        _ => (
            "the page number to list teams from",
            "the number of teams per page",
        ),
    };
    let per_page = ParameterDef::optional("per_page", ParameterType::String, per_page_description);
    [
        ParameterDef::optional("page", ParameterType::String, page_description),
        if suggest_page_size {
            per_page.with_suggested_value("100")
        } else {
            per_page
        },
    ]
}

/// Declare the pack against one Mattermost instance.
#[must_use]
pub fn definition(config: &PackConfig) -> PackDefinition {
    let post_message = FormulaDef {
        name: POST_MESSAGE,
        description: "Sends the given message to the specified Mattermost channel. Return the message object.",
        parameters: vec![
            ParameterDef::required("channel_id", ParameterType::String, "the channel ID to post in"),
            ParameterDef::required(
                "message",
                ParameterType::Html,
                "the message contents, can be formatted with Markdown",
            ),
        ],
        is_action: true,
        result_type: Some(ResultType::String),
        schema: None,
    };

    let channel = FormulaDef {
        name: CHANNEL,
        description: "Gets details about the specified Mattermost channel.",
        parameters: vec![ParameterDef::required(
            "channel_id",
            ParameterType::String,
            "the channel ID to get details for",
        )],
        is_action: false,
        result_type: Some(ResultType::Object),
        schema: None,
    };

    let mut user_params = vec![ParameterDef::optional(
        "team_id",
        ParameterType::String,
        "the team ID to list users from",
    )];
    user_params.extend(pagination_parameters("users", true));

    let mut channel_params = vec![ParameterDef::required(
        "team_id",
        ParameterType::String,
        "the team ID to list channels from",
    )];
    channel_params.extend(pagination_parameters("channels", true));

    let sync_tables = vec![
        SyncTableDef {
            name: USERS_TABLE,
            identity_name: "User",
            schema: USER_SCHEMA,
            formula: FormulaDef {
                name: "SyncUsers",
                description: "List all users in a Mattermost instance.",
                parameters: user_params,
                is_action: false,
                result_type: None,
                schema: None,
            },
        },
        SyncTableDef {
            name: CHANNELS_TABLE,
            identity_name: "Channel",
            schema: CHANNEL_SCHEMA,
            formula: FormulaDef {
                name: "SyncChannels",
                description: "List all public channels in a Mattermost instance.",
                parameters: channel_params,
                is_action: false,
                result_type: None,
                schema: None,
            },
        },
        SyncTableDef {
            name: TEAMS_TABLE,
            identity_name: "Team",
            schema: TEAM_SCHEMA,
            formula: FormulaDef {
                name: "SyncTeams",
                description: "List all teams in a Mattermost instance.",
                parameters: pagination_parameters("teams", false).to_vec(),
                is_action: false,
                result_type: None,
                schema: None,
            },
        },
    ];

    PackDefinition {
        network_domains: vec![config.network_domain.clone()],
        user_authentication: UserAuthentication {
            kind: "OAuth2",
            authorization_url: config.authorization_url.to_string(),
            token_url: config.token_url.to_string(),
        },
        formulas: vec![post_message, channel],
        sync_tables,
    }
}

impl PackDefinition {
    #[must_use]
    pub fn formula(&self, name: &str) -> Option<&FormulaDef> {
        self.formulas.iter().find(|f| f.name == name)
    }

    /// Look a sync table up by table name or by its formula's name.
    #[must_use]
    pub fn sync_table(&self, name: &str) -> Option<&SyncTableDef> {
        self.sync_tables
            .iter()
            .find(|t| t.name == name || t.formula.name == name)
    }

    /// Run a plain formula with positional host arguments.
    ///
    /// `PostMessage` yields the created post re-serialized as a JSON string;
    /// `Channel` yields the channel object untouched.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFormula`, `InvalidParameter`, or whatever the client call fails with.
    pub async fn execute_formula<F: Fetcher>(
        &self,
        client: &MattermostClient<F>,
        name: &str,
        args: &[Option<String>],
    ) -> Result<Value, MattermostError> {
        let formula = self
            .formula(name)
            .ok_or_else(|| MattermostError::UnknownFormula(name.to_string()))?;
        let args = Arguments::bind(&formula.parameters, args)?;

        match formula.name {
            POST_MESSAGE => {
                let post = client
                    .send_message(args.required("channel_id")?, args.required("message")?)
                    .await?;
                Ok(Value::String(post.to_string()))
            }
            CHANNEL => {
                let channel = client.get_channel(args.required("channel_id")?).await?;
                Ok(Value::Object(channel))
            }
            other => Err(MattermostError::UnknownFormula(other.to_string())),
        }
    }

    /// Run a sync table's formula and return its rows as JSON objects.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFormula`, `InvalidParameter`, or whatever the client call fails with.
    pub async fn execute_sync<F: Fetcher>(
        &self,
        client: &MattermostClient<F>,
        name: &str,
        args: &[Option<String>],
    ) -> Result<SyncResult<Value>, MattermostError> {
        let table = self
            .sync_table(name)
            .ok_or_else(|| MattermostError::UnknownFormula(name.to_string()))?;
        let args = Arguments::bind(&table.formula.parameters, args)?;
        let page = args.get("page");
        let per_page = args.get("per_page");

        let rows = match table.name {
            USERS_TABLE => client
                .list_users(args.get("team_id"), page, per_page)
                .await?
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?,
            CHANNELS_TABLE => client
                .list_channels(args.required("team_id")?, page, per_page)
                .await?
                .into_iter()
                .map(|c| Value::Object(c.into_fields()))
                .collect(),
            TEAMS_TABLE => client
                .list_teams(page, per_page)
                .await?
                .into_iter()
                .map(|t| Value::Object(t.into_fields()))
                .collect(),
            other => return Err(MattermostError::UnknownFormula(other.to_string())),
        };

        info!("Sync table {} produced {} rows", table.name, rows.len());
        Ok(SyncResult::new(rows))
    }
}
