//! Blocking executor that runs `CrocodocClient` requests over the network.
//!
//! # Design
//! `Crocodoc` pairs the stateless client with a `ureq::Agent`. The agent is
//! configured not to turn 4xx/5xx into errors, so status interpretation stays
//! in the `parse_*` methods and every status code reaches the same code path
//! whether the round-trip happens here or in a caller's own HTTP stack.
//!
//! Both halves are cheap to clone and safe to share across threads.

use std::fmt;

use tracing::debug;

use crate::client::CrocodocClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::Options;
use crate::types::{DocumentStatus, Session, SharedDocument, UploadSource, UploadedDocument};
use crate::viewer;

/// Crocodoc API client that performs the HTTP calls itself.
#[derive(Clone)]
pub struct Crocodoc {
    client: CrocodocClient,
    agent: ureq::Agent,
}

impl fmt::Debug for Crocodoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crocodoc")
            .field("base_url", &self.client.config().base_url)
            .field("timeout_ms", &self.client.config().timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Crocodoc {
    pub fn new(config: Config) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .build()
            .new_agent();
        Self {
            client: CrocodocClient::new(config),
            agent,
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(Config::from_env()?))
    }

    pub fn config(&self) -> &Config {
        self.client.config()
    }

    /// The underlying request builder / response parser.
    pub fn client(&self) -> &CrocodocClient {
        &self.client
    }

    /// Upload and convert a document referenced by URL or sent as content.
    pub fn upload(&self, source: &UploadSource, options: &Options) -> Result<UploadedDocument, ApiError> {
        let req = self.client.build_upload(source, options)?;
        self.client.parse_upload(self.execute(&req)?)
    }

    /// Conversion status of one or more documents, in request order.
    pub fn status<S: AsRef<str>>(&self, uuids: &[S], options: &Options) -> Result<Vec<DocumentStatus>, ApiError> {
        let req = self.client.build_status(uuids, options)?;
        self.client.parse_status(self.execute(&req)?)
    }

    pub fn delete(&self, uuid: &str, options: &Options) -> Result<bool, ApiError> {
        let req = self.client.build_delete(uuid, options)?;
        self.client.parse_delete(self.execute(&req)?)
    }

    /// Document content, with annotations when `annotated` is set.
    pub fn download(&self, uuid: &str, options: &Options) -> Result<Vec<u8>, ApiError> {
        let req = self.client.build_download(uuid, options)?;
        self.client.parse_download(self.execute(&req)?)
    }

    /// Create a short id for sharing the document publicly.
    pub fn share(&self, uuid: &str, options: &Options) -> Result<SharedDocument, ApiError> {
        let req = self.client.build_share(uuid, options)?;
        self.client.parse_share(self.execute(&req)?)
    }

    /// Create a single-use session id for session-based viewing.
    pub fn get_session(&self, uuid: &str, options: &Options) -> Result<Session, ApiError> {
        let req = self.client.build_get_session(uuid, options)?;
        self.client.parse_get_session(self.execute(&req)?)
    }

    pub fn embeddable_viewer_url(&self, short_id: &str) -> String {
        viewer::embeddable_viewer_url(short_id)
    }

    pub fn session_based_viewer_url(&self, session_id: &str) -> String {
        viewer::session_based_viewer_url(session_id)
    }

    /// Execute an `HttpRequest` and return the response as data.
    ///
    /// Only failures that produce no response at all are errors here; 4xx
    /// and 5xx come back as an `HttpResponse` for the parser to judge.
    pub fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(req.url.as_str());
                for (key, value) in &req.query {
                    builder = builder.query(key, value);
                }
                for (key, value) in &req.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(req.url.as_str());
                for (key, value) in &req.query {
                    builder = builder.query(key, value);
                }
                for (key, value) in &req.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match &req.body {
                    Some(body) => builder.send(body.as_slice()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(method = req.method.as_str(), url = %req.url, status, bytes = body.len(), "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
