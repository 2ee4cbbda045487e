//! Client for the Crocodoc document-conversion API.
//!
//! # Overview
//! Upload documents for conversion, poll their status, download, delete,
//! share them, and create viewing sessions. Each call is a single HTTP round
//! trip against `https://crocodoc.com/api/v1`.
//!
//! ```no_run
//! use crocodoc_core::{Config, Crocodoc, Options, UploadSource};
//!
//! # fn main() -> Result<(), crocodoc_core::ApiError> {
//! let crocodoc = Crocodoc::new(Config::new("my-token"));
//! let doc = crocodoc.upload(&UploadSource::url("http://example.com/file.pdf"), &Options::new())?;
//! let statuses = crocodoc.status(&[doc.uuid.as_str()], &Options::new())?;
//! println!("{:?}", statuses[0].status);
//! println!("{}", crocodoc.embeddable_viewer_url(&doc.short_id));
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `CrocodocClient` is stateless: it holds only its `Config` and splits
//!   every operation into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `Crocodoc` executes those requests with a blocking `ureq` agent.
//! - Options are merged over config defaults, then filtered to a
//!   per-operation allow-list before anything reaches the wire.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod params;
pub mod transport;
pub mod types;
pub mod viewer;

pub use client::CrocodocClient;
pub use config::{Config, API_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{Options, ParamKey, ParamValue, Params};
pub use transport::Crocodoc;
pub use types::{
    ConversionStatus, DocumentStatus, FileUpload, Session, SharedDocument, UploadSource,
    UploadedDocument,
};
pub use viewer::{embeddable_viewer_url, session_based_viewer_url};
