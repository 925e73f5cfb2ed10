use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::WebError;

#[derive(Debug, Deserialize)]
struct UserLookup {
    #[serde(rename = "User_name")]
    user_name: Option<String>,
}

/// HTTP client for the users API `GET /users/{id}`.
#[derive(Clone)]
pub struct UsersApiClient {
    http: reqwest::Client,
    base: Url,
}

impl UsersApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("parse users API url {base_url}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("users API url {base_url} cannot be a base");
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The id goes in as one percent-encoded path segment.
    pub fn user_url(&self, user_id: &str) -> Result<Url, WebError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| WebError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("users")
            .push(user_id);
        Ok(url)
    }

    /// `Ok(None)` when the API answered without a user name (unknown id,
    /// error envelope, or a body that is not JSON). Transport failures are errors.
    pub async fn fetch_user_name(&self, user_id: &str) -> Result<Option<String>, WebError> {
        let url = self.user_url(user_id)?;
        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        let name = serde_json::from_slice::<UserLookup>(&body)
            .ok()
            .and_then(|lookup| lookup.user_name);
        debug!(%url, %status, found = name.is_some(), "users API answered");
        Ok(name)
    }
}
