//! api.video adapters.
//!
//! This module provides HTTP-backed implementations of:
//! - `CredentialPort` (API key exchanged for a bearer token)
//! - `TransportPort` (reqwest, bearer auth injected per request)
//! - `CaptionStorePort` (`/videos/{id}/captions` endpoints)

mod captions;
mod credentials;
mod transport;

pub use captions::ApiVideoCaptions;
pub use credentials::ApiKeyCredentials;
pub use transport::ReqwestTransport;

/// Content type of uploaded caption files
const CAPTION_CONTENT_TYPE: &str = "text/vtt";
/// Multipart field carrying the caption file
const CAPTION_FILE_FIELD: &str = "file";
/// Tokens are renewed this long before they expire
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;
