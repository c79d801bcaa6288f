use std::env;

use url::Url;

use crate::errors::MattermostError;

/// Instance used when `MATTERMOST_BASE_URL` is not set.
pub const DEFAULT_INSTANCE_BASE_URL: &str = "https://coda-pack.cloud.mattermost.com";

const API_PREFIX: [&str; 2] = ["api", "v4"];

/// Immutable settings shared by every request the pack makes.
///
/// Built once at start-up and handed to [`crate::mattermost::MattermostClient`];
/// nothing in the crate mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    pub instance_base_url: Url,
    /// Authority (host and explicit port) every request must target.
    pub network_domain: String,
    pub authorization_url: Url,
    pub token_url: Url,
}

impl PackConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse, is not http(s), or has no host.
    pub fn new(instance_base_url: &str) -> Result<Self, MattermostError> {
        let base = Url::parse(instance_base_url.trim())?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(MattermostError::ConfigError(format!(
                "instance base URL must use http or https, got `{}`",
                base.scheme()
            )));
        }

        let network_domain = authority(&base).ok_or_else(|| {
            MattermostError::ConfigError(format!("instance base URL has no host: {base}"))
        })?;

        let authorization_url = extend_path(&base, &["oauth", "authorize"])?;
        let token_url = extend_path(&base, &["oauth", "access_token"])?;

        Ok(Self {
            instance_base_url: base,
            network_domain,
            authorization_url,
            token_url,
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if `MATTERMOST_BASE_URL` is set but invalid.
    pub fn from_env() -> Result<Self, MattermostError> {
        let base = env::var("MATTERMOST_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INSTANCE_BASE_URL.to_string());
        Self::new(&base)
    }

    /// Build `{base}/api/v4/{segments...}`, percent-encoding each segment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL cannot carry path segments.
    pub fn api_url(&self, segments: &[&str]) -> Result<Url, MattermostError> {
        let mut all: Vec<&str> = API_PREFIX.to_vec();
        all.extend_from_slice(segments);
        extend_path(&self.instance_base_url, &all)
    }

    /// Whether `url` targets the permitted network domain.
    #[must_use]
    pub fn permits(&self, url: &Url) -> bool {
        authority(url).is_some_and(|a| a.eq_ignore_ascii_case(&self.network_domain))
    }
}

fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn extend_path(base: &Url, segments: &[&str]) -> Result<Url, MattermostError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| MattermostError::ConfigError(format!("cannot extend URL path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
