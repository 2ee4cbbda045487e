//! In-memory stand-in for the Crocodoc API.
//!
//! Serves the six endpoints under `/api/v1`. Every request must carry the
//! configured token, and any parameter outside the endpoint's allow-list is
//! rejected with 400, so a client that leaks options fails loudly.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/v1";

const UPLOAD_PARAMS: &[&str] = &["url", "file", "title", "async", "private", "token"];
const STATUS_PARAMS: &[&str] = &["uuids", "token"];
const DELETE_PARAMS: &[&str] = &["uuid", "token"];
const DOWNLOAD_PARAMS: &[&str] = &["uuid", "annotated", "token"];
const SHARE_PARAMS: &[&str] = &["uuid", "editable", "token"];
const SESSION_PARAMS: &[&str] = &["uuid", "token", "downloadable", "editable", "name"];

/// Appended to downloads requested with `annotated=true`.
pub const ANNOTATION_MARKER: &[u8] = b"\n%%crocodoc-annotations";

/// A stored document as the mock sees it.
#[derive(Clone, Debug, Serialize)]
pub struct Document {
    pub uuid: String,
    #[serde(rename = "shortId")]
    pub short_id: String,
    pub title: Option<String>,
    pub source_url: Option<String>,
    pub private: bool,
    pub async_: bool,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// A session handed out by `session/get`.
#[derive(Clone, Debug, Serialize)]
pub struct IssuedSession {
    pub session_id: String,
    pub uuid: String,
    pub name: Option<String>,
    pub editable: bool,
    pub downloadable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Store {
    pub documents: HashMap<String, Document>,
    pub sessions: Vec<IssuedSession>,
}

/// Shared server state. Clone it before building the router to inspect the
/// store from a test.
#[derive(Clone)]
pub struct MockState {
    pub token: String,
    pub store: Arc<RwLock<Store>>,
}

impl MockState {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            store: Arc::new(RwLock::new(Store::default())),
        }
    }
}

pub fn app(token: &str) -> Router {
    app_with_state(MockState::new(token))
}

pub fn app_with_state(state: MockState) -> Router {
    let api = Router::new()
        .route("/document/upload", get(upload_by_url).post(upload_file))
        .route("/document/status", get(status))
        .route("/document/delete", get(delete))
        .route("/document/download", get(download))
        .route("/document/share", get(share))
        .route("/session/get", get(get_session));
    Router::new().nest(API_PREFIX, api).with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

type Params = HashMap<String, String>;

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Reject unknown parameters, then check the token.
fn authorize(state: &MockState, params: &Params, allowed: &[&str]) -> Result<(), Response> {
    if let Some(key) = params.keys().find(|k| !allowed.contains(&k.as_str())) {
        debug!(param = %key, "unexpected parameter");
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            &format!("unexpected parameter: {key}"),
        ));
    }
    match params.get("token") {
        Some(token) if *token == state.token => Ok(()),
        _ => Err(api_error(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

fn flag(params: &Params, key: &str) -> Result<bool, Response> {
    match params.get(key).map(String::as_str) {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(api_error(
            StatusCode::BAD_REQUEST,
            &format!("{key} must be true or false, got {other}"),
        )),
    }
}

fn required<'a>(params: &'a Params, key: &str) -> Result<&'a str, Response> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, &format!("missing parameter: {key}")))
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..5].to_string()
}

async fn store_document(
    state: &MockState,
    params: &Params,
    source_url: Option<String>,
    content: Vec<u8>,
) -> Result<Response, Response> {
    let doc = Document {
        uuid: Uuid::new_v4().to_string(),
        short_id: short_id(),
        title: params.get("title").cloned(),
        source_url,
        private: flag(params, "private")?,
        async_: flag(params, "async")?,
        content,
    };
    info!(uuid = %doc.uuid, bytes = doc.content.len(), "document uploaded");
    let body = json!({ "shortId": doc.short_id, "uuid": doc.uuid });
    state.store.write().await.documents.insert(doc.uuid.clone(), doc);
    Ok(Json(body).into_response())
}

async fn upload_by_url(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Response, Response> {
    authorize(&state, &params, UPLOAD_PARAMS)?;
    let url = required(&params, "url")?.to_string();
    let content = format!("%PDF-mock converted from {url}").into_bytes();
    store_document(&state, &params, Some(url), content).await
}

async fn upload_file(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let mut params = Params::new();
    let mut content = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        let data = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e.to_string()))?;
        if name == "file" && is_file {
            content = Some(data.to_vec());
            params.insert(name, String::new());
        } else {
            params.insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    authorize(&state, &params, UPLOAD_PARAMS)?;
    let content = content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "missing parameter: file"))?;
    store_document(&state, &params, None, content).await
}

async fn status(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Response, Response> {
    authorize(&state, &params, STATUS_PARAMS)?;
    let uuids = required(&params, "uuids")?;
    let store = state.store.read().await;
    let entries: Vec<serde_json::Value> = uuids
        .split(',')
        .map(|uuid| match store.documents.get(uuid) {
            Some(_) => json!({ "uuid": uuid, "status": "DONE", "viewable": true }),
            None => json!({
                "uuid": uuid,
                "status": "ERROR",
                "viewable": false,
                "error": "invalid uuid"
            }),
        })
        .collect();
    Ok(Json(entries).into_response())
}

async fn delete(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Response, Response> {
    authorize(&state, &params, DELETE_PARAMS)?;
    let uuid = required(&params, "uuid")?;
    match state.store.write().await.documents.remove(uuid) {
        // The real service answers with a bare literal here.
        Some(_) => Ok("true".into_response()),
        None => Err(api_error(StatusCode::BAD_REQUEST, "invalid uuid")),
    }
}

async fn download(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Response, Response> {
    authorize(&state, &params, DOWNLOAD_PARAMS)?;
    let uuid = required(&params, "uuid")?;
    let annotated = flag(&params, "annotated")?;
    let store = state.store.read().await;
    let doc = store
        .documents
        .get(uuid)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "invalid uuid"))?;
    let mut bytes = doc.content.clone();
    if annotated {
        bytes.extend_from_slice(ANNOTATION_MARKER);
    }
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

async fn share(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Response, Response> {
    authorize(&state, &params, SHARE_PARAMS)?;
    let uuid = required(&params, "uuid")?;
    flag(&params, "editable")?;
    let mut store = state.store.write().await;
    let doc = store
        .documents
        .get_mut(uuid)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "invalid uuid"))?;
    doc.short_id = short_id();
    Ok(Json(json!({ "shortId": doc.short_id })).into_response())
}

async fn get_session(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Response, Response> {
    authorize(&state, &params, SESSION_PARAMS)?;
    let uuid = required(&params, "uuid")?.to_string();
    let session = IssuedSession {
        session_id: Uuid::new_v4().simple().to_string(),
        name: params.get("name").cloned(),
        editable: flag(&params, "editable")?,
        downloadable: flag(&params, "downloadable")?,
        uuid,
    };
    let mut store = state.store.write().await;
    if !store.documents.contains_key(&session.uuid) {
        return Err(api_error(StatusCode::BAD_REQUEST, "invalid uuid"));
    }
    let body = json!({ "sessionId": session.session_id });
    store.sessions.push(session);
    Ok(Json(body).into_response())
}
