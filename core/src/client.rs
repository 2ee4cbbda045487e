//! Stateless HTTP request builder and response parser for the Crocodoc API.
//!
//! # Design
//! `CrocodocClient` holds only its `Config` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Building always goes through the same three steps: merge
//! options over the config, set the operation's own parameter, restrict to
//! the operation's allow-list.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart;
use crate::params::{Options, ParamKey, ParamValue, Params};
use crate::types::{
    DocumentStatus, ErrorPayload, Session, SharedDocument, UploadSource, UploadedDocument,
};

pub const UPLOAD_PATH: &str = "/document/upload";
pub const STATUS_PATH: &str = "/document/status";
pub const DELETE_PATH: &str = "/document/delete";
pub const DOWNLOAD_PATH: &str = "/document/download";
pub const SHARE_PATH: &str = "/document/share";
pub const SESSION_PATH: &str = "/session/get";

pub const UPLOAD_PARAMS: &[ParamKey] = &[
    ParamKey::Url,
    ParamKey::File,
    ParamKey::Title,
    ParamKey::Async,
    ParamKey::Private,
    ParamKey::Token,
];
pub const STATUS_PARAMS: &[ParamKey] = &[ParamKey::Uuids, ParamKey::Token];
pub const DELETE_PARAMS: &[ParamKey] = &[ParamKey::Uuid, ParamKey::Token];
pub const DOWNLOAD_PARAMS: &[ParamKey] = &[ParamKey::Uuid, ParamKey::Annotated, ParamKey::Token];
pub const SHARE_PARAMS: &[ParamKey] = &[ParamKey::Uuid, ParamKey::Editable, ParamKey::Token];
pub const SESSION_PARAMS: &[ParamKey] = &[
    ParamKey::Uuid,
    ParamKey::Token,
    ParamKey::Downloadable,
    ParamKey::Editable,
    ParamKey::Name,
];

/// Synchronous, stateless client for the Crocodoc API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. Use `Crocodoc` to have the round-trip executed too.
#[derive(Debug, Clone)]
pub struct CrocodocClient {
    config: Config,
}

impl CrocodocClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build_upload(&self, source: &UploadSource, options: &Options) -> Result<HttpRequest, ApiError> {
        let mut params = Params::merged(&self.config, options);
        match source {
            UploadSource::Url(url) => {
                if url.trim().is_empty() {
                    return Err(ApiError::InvalidArgument("upload URL is empty".into()));
                }
                params.set(ParamKey::Url, ParamValue::Text(url.clone()));
            }
            // Empty files are forwarded; the service decides whether to accept them.
            UploadSource::File(upload) => {
                params.set(ParamKey::File, ParamValue::File(upload.clone()));
            }
        }
        Ok(self.request(UPLOAD_PATH, params.restrict(UPLOAD_PARAMS)))
    }

    pub fn build_status<S: AsRef<str>>(&self, uuids: &[S], options: &Options) -> Result<HttpRequest, ApiError> {
        if uuids.is_empty() {
            return Err(ApiError::InvalidArgument("status needs at least one uuid".into()));
        }
        let mut joined = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            joined.push(require_id(uuid.as_ref(), "uuid")?);
        }
        let mut params = Params::merged(&self.config, options);
        params.set(ParamKey::Uuids, ParamValue::Text(joined.join(",")));
        Ok(self.request(STATUS_PATH, params.restrict(STATUS_PARAMS)))
    }

    pub fn build_delete(&self, uuid: &str, options: &Options) -> Result<HttpRequest, ApiError> {
        self.build_for_uuid(DELETE_PATH, DELETE_PARAMS, uuid, options)
    }

    pub fn build_download(&self, uuid: &str, options: &Options) -> Result<HttpRequest, ApiError> {
        self.build_for_uuid(DOWNLOAD_PATH, DOWNLOAD_PARAMS, uuid, options)
    }

    pub fn build_share(&self, uuid: &str, options: &Options) -> Result<HttpRequest, ApiError> {
        self.build_for_uuid(SHARE_PATH, SHARE_PARAMS, uuid, options)
    }

    pub fn build_get_session(&self, uuid: &str, options: &Options) -> Result<HttpRequest, ApiError> {
        self.build_for_uuid(SESSION_PATH, SESSION_PARAMS, uuid, options)
    }

    pub fn parse_upload(&self, response: HttpResponse) -> Result<UploadedDocument, ApiError> {
        decode(response, UPLOAD_PATH)
    }

    pub fn parse_status(&self, response: HttpResponse) -> Result<Vec<DocumentStatus>, ApiError> {
        decode(response, STATUS_PATH)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<bool, ApiError> {
        decode(response, DELETE_PATH)
    }

    /// Raw document bytes. The body is never interpreted.
    pub fn parse_download(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        check_status(&response, DOWNLOAD_PATH)?;
        debug!(path = DOWNLOAD_PATH, bytes = response.body.len(), "document downloaded");
        Ok(response.body)
    }

    pub fn parse_share(&self, response: HttpResponse) -> Result<SharedDocument, ApiError> {
        decode(response, SHARE_PATH)
    }

    pub fn parse_get_session(&self, response: HttpResponse) -> Result<Session, ApiError> {
        decode(response, SESSION_PATH)
    }

    fn build_for_uuid(
        &self,
        path: &str,
        allowed: &[ParamKey],
        uuid: &str,
        options: &Options,
    ) -> Result<HttpRequest, ApiError> {
        let uuid = require_id(uuid, "uuid")?;
        let mut params = Params::merged(&self.config, options);
        params.set(ParamKey::Uuid, ParamValue::Text(uuid.to_string()));
        Ok(self.request(path, params.restrict(allowed)))
    }

    /// GET with a query string, or POST with a multipart body when the
    /// parameters carry a file.
    fn request(&self, path: &str, params: Params) -> HttpRequest {
        let url = format!("{}{path}", self.config.api_root());
        let names: Vec<&'static str> = params.keys().map(|k| k.as_str()).collect();
        let (fields, file) = params.into_fields();

        let request = match file {
            None => HttpRequest {
                method: HttpMethod::Get,
                url,
                query: fields,
                headers: Vec::new(),
                body: None,
            },
            Some(upload) => {
                let body = multipart::encode(&fields, ParamKey::File.as_str(), &upload);
                HttpRequest {
                    method: HttpMethod::Post,
                    url,
                    query: Vec::new(),
                    headers: vec![("content-type".to_string(), body.content_type)],
                    body: Some(body.bytes),
                }
            }
        };
        debug!(method = request.method.as_str(), path, params = ?names, "built request");
        request
    }
}

fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::InvalidArgument(format!("{what} is empty")));
    }
    Ok(id)
}

/// Map non-2xx status codes to `ApiError::HttpStatus`.
fn check_status(response: &HttpResponse, path: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(path, status = response.status, "request failed");
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body_text(),
    })
}

/// Decode a JSON response body into `T`.
///
/// A bare `true` body short-circuits to the boolean without parsing. A JSON
/// object with an `error` string is the service reporting a failure.
fn decode<T: DeserializeOwned>(response: HttpResponse, path: &str) -> Result<T, ApiError> {
    check_status(&response, path)?;
    let text = std::str::from_utf8(&response.body)
        .map_err(|e| ApiError::Deserialization(format!("{path}: body is not UTF-8: {e}")))?;

    let value = if text.trim() == "true" {
        trace!(path, "bare true body");
        Value::Bool(true)
    } else {
        serde_json::from_str::<Value>(text)
            .map_err(|e| ApiError::Deserialization(format!("{path}: {e}")))?
    };

    if value.get("error").is_some_and(Value::is_string) {
        let payload: ErrorPayload = serde_json::from_value(value)
            .map_err(|e| ApiError::Deserialization(format!("{path}: {e}")))?;
        warn!(path, error = %payload.error, "remote error");
        return Err(ApiError::Remote {
            message: payload.error,
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(format!("{path}: {e}")))
}
