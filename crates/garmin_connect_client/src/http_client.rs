//! HTTP client implementation for Garmin Connect.
//!
//! This module provides a reqwest-based implementation of the
//! [`ActivitySource`](crate::ActivitySource) trait. The session lives in the
//! client's cookie store, so one instance must be used for login and for
//! every call after it.

use crate::utils::value_as_i64;
use crate::{ActivityPage, ActivitySource, Credentials, FileFormat, GarminError};
use async_trait::async_trait;
use regex::Regex;
use secrecy::ExposeSecret;
use std::sync::LazyLock;

static SERVICE_TICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ticket=([^"'&\s]+)"#).expect("ticket pattern"));

/// Client for Garmin Connect using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestGarminClient {
    base_url: String,
    sso_url: String,
    client: reqwest::Client,
}

impl ReqwestGarminClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Garmin Connect base URL (e.g., "https://connect.garmin.com")
    /// * `sso_url` - single sign-on base URL (e.g., "https://sso.garmin.com/sso")
    pub fn new(base_url: &str, sso_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            sso_url: sso_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(&cfg.base_url, &cfg.sso_url)
    }

    /// URL the service exports `activity_id` from in the given format.
    pub fn file_url(&self, activity_id: i64, format: FileFormat) -> String {
        match format {
            FileFormat::Original => format!(
                "{}/proxy/download-service/files/activity/{}",
                self.base_url, activity_id
            ),
            other => format!(
                "{}/proxy/activity-service-1.1/{}/activity/{}?full=true",
                self.base_url,
                other.as_str(),
                activity_id
            ),
        }
    }

    fn service_url(&self) -> String {
        format!("{}/modern/", self.base_url)
    }

    /// Execute a request and expect a successful response.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GarminError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> GarminError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => GarminError::NotFound(body_snippet),
            401 | 403 => GarminError::Auth(body_snippet),
            _ => GarminError::from_status(status, body_snippet),
        }
    }
}

/// Pull the service ticket out of the sign-in response page.
pub fn extract_ticket(body: &str) -> Option<&str> {
    SERVICE_TICKET
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Unwrap the search payload
/// `{"results": {"activities": [{"activity": {…}}], "search": {"totalFound": …}}}`.
pub fn parse_search_page(payload: serde_json::Value) -> Result<ActivityPage, GarminError> {
    let results = payload
        .get("results")
        .ok_or_else(|| GarminError::MalformedRecord("search response has no results".into()))?;
    let total = results
        .pointer("/search/totalFound")
        .ok_or_else(|| GarminError::MalformedRecord("search response has no totalFound".into()))?;
    let total_found = value_as_i64(total)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| GarminError::MalformedRecord(format!("bad totalFound: {total}")))?;
    let activities = match results.get("activities") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.get("activity").cloned().ok_or_else(|| {
                    GarminError::MalformedRecord("search entry has no activity".into())
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(GarminError::MalformedRecord(format!(
                "activities is not a list: {other}"
            )));
        }
    };
    Ok(ActivityPage {
        activities,
        total_found,
    })
}

#[async_trait]
impl ActivitySource for ReqwestGarminClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<(), GarminError> {
        let url = format!("{}/signin", self.sso_url);
        let service = self.service_url();
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose_secret()),
            ("embed", "true"),
        ];
        let resp = self
            .execute(
                self.client
                    .post(&url)
                    .query(&[("service", service.as_str())])
                    .form(&form),
            )
            .await?;
        let body = resp.text().await?;
        let ticket = extract_ticket(&body)
            .ok_or_else(|| GarminError::Auth("no service ticket in sign-in response".into()))?;
        tracing::debug!("sign-in accepted, exchanging service ticket");

        let resp = self
            .client
            .get(&service)
            .query(&[("ticket", ticket)])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(GarminError::Auth(format!(
                "ticket exchange returned status {status}"
            )));
        }
        tracing::info!(username = %credentials.username, "logged in to Garmin Connect");
        Ok(())
    }

    async fn fetch_activity_page(
        &self,
        start: u32,
        limit: u32,
    ) -> Result<ActivityPage, GarminError> {
        let url = format!(
            "{}/proxy/activity-search-service-1.2/json/activities",
            self.base_url
        );
        let qp = [("start", start.to_string()), ("limit", limit.to_string())];
        let resp = self.execute(self.client.get(&url).query(&qp)).await?;
        let payload: serde_json::Value = resp.json().await?;
        parse_search_page(payload)
    }

    async fn fetch_file(
        &self,
        activity_id: i64,
        format: FileFormat,
    ) -> Result<Vec<u8>, GarminError> {
        let url = self.file_url(activity_id, format);
        let resp = self.execute(self.client.get(&url)).await?;
        let bytes = resp.bytes().await?;
        tracing::debug!(activity_id, %format, bytes = bytes.len(), "fetched activity file");
        Ok(bytes.to_vec())
    }
}
