//! HTTP implementation of [`ResourceClient`] for the certification REST API.
//!
//! # Security Note - Logging
//!
//! The optional API token is held in a `SecretBox` and only exposed while the
//! `Authorization` header is built. The header value itself goes through
//! `RedactedHeader`, whose `Display` and `Debug` output is `[REDACTED]`, so
//! enabling `RUST_LOG=reqwest=debug` does not leak it through our own logging.

use std::fmt;
use std::time::Duration;

use reqwest::header;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretBox};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::filter::DateRange;
use crate::types::{EntityId, Report};

use super::error as classify;
use super::{Ack, Page, REPORT_FILTER_PATH, RemoteEntity, Resource, ResourceClient};

/// Wrapper for sensitive header values that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value)
            .map_err(|_| DeskError::Config("API token contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// REST client for the ships, certificates and reports collections
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: Option<SecretBox<String>>,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::with_timeouts(
            config.api_url()?,
            config.timeout(),
            config.connect_timeout(),
        )?;
        if let Some(token) = config.api_token() {
            client.token = Some(SecretBox::new(Box::new(token)));
        }
        Ok(client)
    }

    /// Create a client with explicit timeouts
    pub fn with_timeouts(base_url: Url, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| DeskError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: None,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path against the base URL, keeping any base path prefix
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        let mut url = Url::parse(&raw)
            .map_err(|e| DeskError::Config(format!("invalid endpoint '{raw}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let auth = RedactedHeader::bearer(token.expose_secret());
            builder = builder.header(header::AUTHORIZATION, auth.as_header_value()?);
        }
        Ok(builder)
    }

    /// Send one request and return the decoded JSON body.
    ///
    /// Exactly one attempt is made; failures are classified, never retried.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder
            .send()
            .await
            .map_err(|e| classify::from_request_error(e, self.timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify::from_request_error(e, self.timeout))?;

        if !status.is_success() {
            let err = classify::from_status(status, &bytes);
            debug!(status = status.as_u16(), error = %err, "request rejected");
            return Err(err);
        }

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                DeskError::application(format!("unexpected response from server: {e}"))
            })?
        };

        if let Some(err) = classify::from_success_body(&body) {
            return Err(err);
        }
        Ok(body)
    }

    fn ack(body: &Value) -> Result<Ack> {
        classify::reason_from_body(body)
            .map(|message| Ack { message })
            .ok_or_else(|| DeskError::application("the server did not confirm the change"))
    }
}

impl ResourceClient for HttpClient {
    async fn list<T: RemoteEntity>(&self, page: u32, page_size: u32) -> Result<Page<T>> {
        let resource = T::RESOURCE;
        let url = self.endpoint(
            resource.list_path(),
            &[("page", page.to_string()), ("limit", page_size.to_string())],
        )?;
        debug!(%resource, page, page_size, "listing");

        let body = self.execute(self.request(Method::GET, url)?).await?;
        let (items, total) = T::decode_list(body)?;
        Ok(Page::new(items, page, page_size, total))
    }

    async fn search<T: RemoteEntity>(&self, query: &str) -> Result<Vec<T>> {
        let resource = T::RESOURCE;
        let path = resource
            .search_path()
            .ok_or_else(|| resource.unsupported("search"))?;
        let url = self.endpoint(path, &[("searchTerm", query.to_string())])?;
        debug!(%resource, query, "searching");

        let body = self.execute(self.request(Method::GET, url)?).await?;
        super::decode_records(&body, resource.collection_key())
    }

    async fn create<T: RemoteEntity>(&self, draft: &T::Draft) -> Result<Ack> {
        let resource = T::RESOURCE;
        let url = self.endpoint(resource.create_path(), &[])?;
        info!(%resource, "creating record");

        let body = self
            .execute(self.request(Method::POST, url)?.json(draft))
            .await?;
        Self::ack(&body)
    }

    async fn delete<T: RemoteEntity>(&self, id: &EntityId) -> Result<Ack> {
        let resource = T::RESOURCE;
        let path = resource
            .delete_path()
            .ok_or_else(|| resource.unsupported("delete"))?;
        let url = self.endpoint(path, &[("uid", id.to_string())])?;
        info!(%resource, %id, "deleting record");

        let body = self.execute(self.request(Method::DELETE, url)?).await?;
        Self::ack(&body)
    }

    async fn filter_reports(&self, range: &DateRange) -> Result<Vec<Report>> {
        let url = self.endpoint(
            REPORT_FILTER_PATH,
            &[
                ("startDate", range.start.to_string()),
                ("endDate", range.end.to_string()),
            ],
        )?;
        debug!(start = %range.start, end = %range.end, "filtering reports");

        let body = self.execute(self.request(Method::GET, url)?).await?;
        super::decode_records(&body, Resource::Reports.collection_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpClient {
        HttpClient::with_timeouts(
            Url::parse(base).unwrap(),
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://desk.example.com/backend/");
        let url = client
            .endpoint("/api/ships/getAll", &[("page", "2".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://desk.example.com/backend/api/ships/getAll?page=2"
        );
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client = client("http://localhost:3001");
        let url = client
            .endpoint("/api/ships/search", &[("searchTerm", "MV Sea & Sky".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/api/ships/search?searchTerm=MV+Sea+%26+Sky"
        );
    }

    #[test]
    fn test_redacted_header_formatting() {
        let header = RedactedHeader::bearer("super-secret");
        assert_eq!(format!("{header}"), "[REDACTED]");
        assert!(!format!("{header:?}").contains("super-secret"));
    }

    #[test]
    fn test_ack_requires_message() {
        let ack = HttpClient::ack(&serde_json::json!({"message": "Ship created"})).unwrap();
        assert_eq!(ack.message, "Ship created");
        assert!(HttpClient::ack(&serde_json::json!({})).is_err());
    }
}
