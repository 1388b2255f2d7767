//! HTTP transport for the platform REST API.

use crate::error::ApiError;
use crate::types::{
    CheckConnectionResponse, CheckDestinationRequest, CheckSourceRequest, CreateConnectionRequest,
    CreateConnectionResponse, CreateDestinationRequest, CreateDestinationResponse,
    CreateSourceRequest, CreateSourceResponse, DiscoverSchemaRequest, DiscoveredCatalog,
    SchemaFilter,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the platform REST API.
///
/// Stateless apart from the base URL, bearer token, and workspace id. One
/// method per remote operation; every call is bounded by the configured
/// timeout and surfaces its first failure as an [`ApiError`] without
/// retrying.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    workspace_id: String,
}

impl PlatformClient {
    /// Create a client against `base_url` (e.g. `https://api.platform.dev/v1`).
    pub fn new(
        base_url: &str,
        api_token: &str,
        workspace_id: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Build)?;

        Ok(PlatformClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            workspace_id: workspace_id.to_string(),
        })
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    /// Create a source connector instance. Returns the new source id.
    pub async fn create_source(
        &self,
        name: &str,
        definition_id: &str,
        config: serde_json::Value,
    ) -> Result<String, ApiError> {
        let request = CreateSourceRequest {
            name: name.to_string(),
            source_definition_id: definition_id.to_string(),
            workspace_id: self.workspace_id.clone(),
            connection_configuration: config,
        };
        let response: CreateSourceResponse = self.post("/sources/create", &request).await?;
        Ok(response.source_id)
    }

    /// Validate a source. Returns true only when the platform reports the
    /// check as succeeded; a failed check is a normal `false`, not an error.
    pub async fn check_source(&self, source_id: &str) -> Result<bool, ApiError> {
        let request = CheckSourceRequest {
            source_id: source_id.to_string(),
        };
        let response: CheckConnectionResponse =
            self.post("/sources/check_connection", &request).await?;
        if !response.succeeded() {
            if let Some(message) = &response.message {
                tracing::debug!("Source {source_id} check reported: {message}");
            }
        }
        Ok(response.succeeded())
    }

    // ------------------------------------------------------------------------
    // Destinations
    // ------------------------------------------------------------------------

    /// Create a destination connector instance. Returns the new destination id.
    pub async fn create_destination(
        &self,
        name: &str,
        definition_id: &str,
        config: serde_json::Value,
    ) -> Result<String, ApiError> {
        let request = CreateDestinationRequest {
            name: name.to_string(),
            destination_definition_id: definition_id.to_string(),
            workspace_id: self.workspace_id.clone(),
            connection_configuration: config,
        };
        let response: CreateDestinationResponse =
            self.post("/destinations/create", &request).await?;
        Ok(response.destination_id)
    }

    /// Validate a destination. Same contract as [`Self::check_source`].
    pub async fn check_destination(&self, destination_id: &str) -> Result<bool, ApiError> {
        let request = CheckDestinationRequest {
            destination_id: destination_id.to_string(),
        };
        let response: CheckConnectionResponse = self
            .post("/destinations/check_connection", &request)
            .await?;
        if !response.succeeded() {
            if let Some(message) = &response.message {
                tracing::debug!("Destination {destination_id} check reported: {message}");
            }
        }
        Ok(response.succeeded())
    }

    // ------------------------------------------------------------------------
    // Schema discovery
    // ------------------------------------------------------------------------

    /// Discover the streams a source exposes.
    ///
    /// The filter is sent only when at least one of its fields is supplied;
    /// an empty filter is left off the wire entirely.
    pub async fn discover_schema(
        &self,
        source_id: &str,
        filter: SchemaFilter,
    ) -> Result<DiscoveredCatalog, ApiError> {
        let request = DiscoverSchemaRequest {
            source_id: source_id.to_string(),
            connector_type: "source".to_string(),
            schema: if filter.is_empty() { None } else { Some(filter) },
        };
        self.post("/connections/discover_schema", &request).await
    }

    // ------------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------------

    /// Create a connection binding a source, a destination, a schedule, and
    /// a sync catalog. Returns the new connection id.
    pub async fn create_connection(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<String, ApiError> {
        let response: CreateConnectionResponse = self.post("/connections/create", request).await?;
        Ok(response.connection_id)
    }

    /// Fetch a connection by id. Returns the raw record.
    pub async fn get_connection(&self, connection_id: &str) -> Result<serde_json::Value, ApiError> {
        self.get("/connections/get", &[("connectionId", connection_id)])
            .await
    }

    // ------------------------------------------------------------------------
    // Transport helpers
    // ------------------------------------------------------------------------

    async fn post<Req, Resp>(&self, path: &str, payload: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(payload)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                method: "POST",
                path: path.to_string(),
                source,
            })?;

        self.decode("POST", path, response).await
    }

    async fn get<Resp>(&self, path: &str, query: &[(&str, &str)]) -> Result<Resp, ApiError>
    where
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                method: "GET",
                path: path.to_string(),
                source,
            })?;

        self.decode("GET", path, response).await
    }

    async fn decode<Resp>(
        &self,
        method: &'static str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Resp, ApiError>
    where
        Resp: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                method,
                path: path.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            method,
            path: path.to_string(),
            body,
            source,
        })
    }
}

/// Prefer the structured `message` field when the error body is JSON
/// carrying one; otherwise report the body verbatim.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|message| message.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Err(_) => body.to_string(),
    }
}
