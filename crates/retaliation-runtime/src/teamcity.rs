//! TeamCity status source.
//!
//! Asks TeamCity for the most recent finished build that failed and scrapes
//! the culprit out of the response. The body is not parsed: the two fields
//! we care about are pulled out with patterns, and a missing field simply
//! means there is nothing to act on.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::ACCEPT;
use tracing::{debug, trace};
use url::Url;

use retaliation_core::{Credentials, ServerConfig};
use retaliation_models::BuildEvent;

use crate::error::{Result, StatusError};
use crate::source::StatusSource;

/// REST locator for the latest finished, failed build.
pub const FAILED_BUILDS_PATH: &str = "httpAuth/app/rest/builds/running:false,status:failure";

/// Request timeout for each poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept header sent with every poll.
const ACCEPT_VALUE: &str = "application/json, text/javascript";

/// Project label used when the build record has none.
pub const UNKNOWN_PROJECT: &str = "unknown project";

/// Regex to extract the responsible user.
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""username":"([^/"]+)"#).expect("Invalid username regex"));

/// Regex to extract the broken project's name.
static PROJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""projectName":"([^/"]+)"#).expect("Invalid project regex"));

/// Extracts a build event from a TeamCity response body.
///
/// Returns `None` when the body names no responsible user.
///
/// # Example
/// ```
/// use retaliation_runtime::scrape_build_event;
///
/// let body = r#"{"projectName":"Web","changes":{"user":{"username":"tom"}}}"#;
/// let event = scrape_build_event(body).unwrap();
/// assert_eq!(event.responsible_user, "tom");
/// assert_eq!(event.project_name, "Web");
/// ```
pub fn scrape_build_event(body: &str) -> Option<BuildEvent> {
    let user = USERNAME_REGEX.captures(body)?.get(1)?.as_str();
    let project = PROJECT_REGEX
        .captures(body)
        .and_then(|c| c.get(1))
        .map_or(UNKNOWN_PROJECT, |m| m.as_str());

    Some(BuildEvent::failed(project, user))
}

/// Builds the failed-build URL under `base`, keeping any path prefix.
pub fn failed_builds_url(base: &Url) -> std::result::Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(FAILED_BUILDS_PATH)
}

/// TeamCity REST client.
pub struct TeamCitySource {
    client: reqwest::blocking::Client,
    url: Url,
    credentials: Option<Credentials>,
}

impl TeamCitySource {
    /// Creates a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the REST URL cannot be built or the HTTP client
    /// cannot be initialised.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let url = failed_builds_url(&config.base_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        debug!(url = %url, authenticated = config.credentials.is_some(), "teamcity source ready");
        Ok(Self {
            client,
            url,
            credentials: config.credentials.clone(),
        })
    }

    /// The URL polled on every cycle.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn fetch(&self) -> Result<String> {
        let mut request = self.client.get(self.url.clone()).header(ACCEPT, ACCEPT_VALUE);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.user, Some(&credentials.password));
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Http {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text()?;
        trace!(bytes = body.len(), "teamcity response received");
        Ok(body)
    }
}

impl StatusSource for TeamCitySource {
    fn failed_build(&mut self) -> Result<Option<BuildEvent>> {
        let body = self.fetch()?;
        Ok(scrape_build_event(&body))
    }
}
