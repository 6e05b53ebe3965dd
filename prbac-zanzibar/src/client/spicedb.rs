//! SpiceDB relationship client over the HTTP gateway
//!
//! Every primitive is a `POST` with a JSON body and bearer-token auth.
//! Streaming endpoints answer with newline-delimited JSON where each line is
//! either `{"result": ...}` or `{"error": ...}`; an error line ends the
//! stream with a failure.

use crate::{
    client::{RelationshipClient, RelationshipStream},
    error::{Result, ZanzibarError},
    models::*,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

const CHECK_PATH: &str = "/v1/permissions/check";
const LOOKUP_RESOURCES_PATH: &str = "/v1/permissions/resources";
const LOOKUP_SUBJECTS_PATH: &str = "/v1/permissions/subjects";
const READ_PATH: &str = "/v1/relationships/read";
const WRITE_PATH: &str = "/v1/relationships/write";

const HAS_PERMISSION: &str = "PERMISSIONSHIP_HAS_PERMISSION";

/// SpiceDB-backed relationship client
pub struct SpiceDbClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SpiceDbClient {
    /// Create a client for the gateway at `base_url` (e.g.
    /// `http://localhost:8443`). `connect_timeout` bounds connection setup
    /// only; streaming reads run until the request is cancelled.
    pub fn new(base_url: &str, token: &str, connect_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ZanzibarError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(http, base_url, token))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(path = path, status = %status, "SpiceDB request failed");
        Err(ZanzibarError::Backend(format!("{} returned {}: {}", path, status, body)))
    }

    async fn post_stream<B, T>(&self, path: &str, body: &B) -> Result<RelationshipStream<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let response = self.post(path, body).await?;
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ZanzibarError::from))
            .boxed();
        Ok(decode_ndjson(body))
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckPermissionRequest<'a> {
    resource: &'a ObjectReference,
    permission: &'a str,
    subject: &'a SubjectReference,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckPermissionResponse {
    #[serde(default)]
    permissionship: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupResourcesRequest<'a> {
    resource_object_type: &'a str,
    permission: &'a str,
    subject: &'a SubjectReference,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResourcesResult {
    resource_object_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupSubjectsRequest<'a> {
    resource: &'a ObjectReference,
    permission: &'a str,
    subject_object_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupSubjectsResult {
    subject: ResolvedSubject,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedSubject {
    subject_object_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadRelationshipsRequest<'a> {
    relationship_filter: WireRelationshipFilter<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRelationshipFilter<'a> {
    resource_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    optional_resource_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    optional_subject_filter: Option<WireSubjectFilter<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSubjectFilter<'a> {
    subject_type: &'a str,
}

#[derive(Deserialize)]
struct ReadRelationshipsResult {
    relationship: Relationship,
}

#[derive(Serialize)]
struct WriteRelationshipsRequest<'a> {
    updates: &'a [RelationshipUpdate],
}

/// One line of a streamed gateway response
#[derive(Deserialize)]
struct StreamLine<T> {
    result: Option<T>,
    error: Option<GatewayStatus>,
}

#[derive(Debug, Deserialize)]
struct GatewayStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

// =============================================================================
// NDJSON decoding
// =============================================================================

type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

struct NdjsonState {
    body: ByteStream,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl NdjsonState {
    /// Pop the next complete line, or the unterminated remainder once the
    /// body is exhausted.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        if let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            return Some(line);
        }

        if self.exhausted && !self.buffer.is_empty() {
            return Some(std::mem::take(&mut self.buffer));
        }

        None
    }
}

fn decode_ndjson<T>(body: ByteStream) -> RelationshipStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let state = NdjsonState {
        body,
        buffer: Vec::new(),
        exhausted: false,
    };
    stream::try_unfold(state, next_item::<T>).boxed()
}

async fn next_item<T: DeserializeOwned>(mut state: NdjsonState) -> Result<Option<(T, NdjsonState)>> {
    loop {
        if let Some(line) = state.next_line() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let item = decode_line::<T>(&line)?;
            return Ok(Some((item, state)));
        }

        if state.exhausted {
            return Ok(None);
        }

        match state.body.next().await {
            Some(chunk) => state.buffer.extend_from_slice(&chunk?),
            None => state.exhausted = true,
        }
    }
}

fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Result<T> {
    let parsed: StreamLine<T> = serde_json::from_slice(line)?;

    if let Some(status) = parsed.error {
        warn!(code = status.code, "SpiceDB stream ended with error: {}", status.message);
        return Err(ZanzibarError::Backend(format!(
            "stream error (code {}): {}",
            status.code, status.message
        )));
    }

    parsed
        .result
        .ok_or_else(|| ZanzibarError::Backend("stream message without result".to_string()))
}

// =============================================================================
// RelationshipClient
// =============================================================================

#[async_trait]
impl RelationshipClient for SpiceDbClient {
    async fn check_permission(
        &self,
        resource: &ObjectReference,
        permission: &str,
        subject: &SubjectReference,
    ) -> Result<Permissionship> {
        let request = CheckPermissionRequest {
            resource,
            permission,
            subject,
        };

        let response: CheckPermissionResponse = self.post(CHECK_PATH, &request).await?.json().await?;
        debug!("Check {}#{}@{}: {}", resource, permission, subject, response.permissionship);

        Ok(if response.permissionship == HAS_PERMISSION {
            Permissionship::HasPermission
        } else {
            Permissionship::NoPermission
        })
    }

    async fn lookup_resources(
        &self,
        resource_type: &str,
        permission: &str,
        subject: &SubjectReference,
    ) -> Result<RelationshipStream<String>> {
        let request = LookupResourcesRequest {
            resource_object_type: resource_type,
            permission,
            subject,
        };

        let results = self
            .post_stream::<_, LookupResourcesResult>(LOOKUP_RESOURCES_PATH, &request)
            .await?;
        Ok(results.map(|r| r.map(|r| r.resource_object_id)).boxed())
    }

    async fn lookup_subjects(
        &self,
        resource: &ObjectReference,
        permission: &str,
        subject_object_type: &str,
    ) -> Result<RelationshipStream<String>> {
        let request = LookupSubjectsRequest {
            resource,
            permission,
            subject_object_type,
        };

        let results = self
            .post_stream::<_, LookupSubjectsResult>(LOOKUP_SUBJECTS_PATH, &request)
            .await?;
        Ok(results.map(|r| r.map(|r| r.subject.subject_object_id)).boxed())
    }

    async fn read_relationships(
        &self,
        filter: &RelationshipFilter,
    ) -> Result<RelationshipStream<Relationship>> {
        let request = ReadRelationshipsRequest {
            relationship_filter: WireRelationshipFilter {
                resource_type: &filter.resource_type,
                optional_resource_id: filter.resource_id.as_deref(),
                optional_subject_filter: filter
                    .subject_type
                    .as_deref()
                    .map(|subject_type| WireSubjectFilter { subject_type }),
            },
        };

        let results = self
            .post_stream::<_, ReadRelationshipsResult>(READ_PATH, &request)
            .await?;
        Ok(results.map(|r| r.map(|r| r.relationship)).boxed())
    }

    async fn write_relationships(&self, updates: Vec<RelationshipUpdate>) -> Result<()> {
        debug!(count = updates.len(), "Writing relationship batch");
        self.post(WRITE_PATH, &WriteRelationshipsRequest { updates: &updates })
            .await?;
        Ok(())
    }
}
