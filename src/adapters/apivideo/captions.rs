use super::{CAPTION_CONTENT_TYPE, CAPTION_FILE_FIELD};
use crate::domain::CaptionTrack;
use crate::error::{CaptionError, RunError};
use crate::ports::captions::CaptionStorePort;
use crate::ports::transport::{FilePart, HttpMethod, HttpRequest, HttpResponse, TransportPort};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Upper bound on followed list pages, in case the service keeps reporting more.
const MAX_LIST_PAGES: u64 = 100;

/// `CaptionStorePort` over the api.video `/videos/{id}/captions` endpoints.
#[derive(Clone)]
pub struct ApiVideoCaptions<T> {
    transport: T,
    base_url: Url,
}

impl<T> ApiVideoCaptions<T>
where
    T: TransportPort,
{
    pub fn new(transport: T, base_url: &str) -> Result<Self, RunError> {
        let invalid = |reason: String| RunError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("cannot be a base URL".to_string()));
        }
        Ok(Self {
            transport,
            base_url: parsed,
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl<T> CaptionStorePort for ApiVideoCaptions<T>
where
    T: TransportPort,
{
    async fn list(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
        info!(video_id, "Listing captions");

        let mut tracks = Vec::new();
        let mut page = 1;
        loop {
            let mut url = self.endpoint(&["videos", video_id, "captions"]);
            if page > 1 {
                url.query_pairs_mut()
                    .append_pair("currentPage", &page.to_string());
            }

            let response = self
                .transport
                .send(HttpRequest::new(HttpMethod::Get, url))
                .await?;
            if !response.is_success() {
                warn!(video_id, page, status = response.status, "Listing captions failed");
                return Err(unexpected(&response));
            }
            tracks.extend(parse_tracks(&response.data)?);

            let total = pages_total(&response.data);
            if page >= total {
                break;
            }
            if page >= MAX_LIST_PAGES {
                warn!(video_id, total, "Caption list truncated");
                break;
            }
            debug!(video_id, page, total, "Fetching next caption page");
            page += 1;
        }

        info!(video_id, count = tracks.len(), "Listed captions");
        Ok(tracks)
    }

    async fn delete(&self, video_id: &str, language: &str) -> Result<(), CaptionError> {
        let url = self.endpoint(&["videos", video_id, "captions", language]);
        info!(video_id, language, "Deleting caption");

        let response = self
            .transport
            .send(HttpRequest::new(HttpMethod::Delete, url))
            .await?;
        match response.status {
            404 => {
                info!(video_id, language, "Caption already absent");
                Ok(())
            }
            _ if response.is_success() => {
                info!(video_id, language, "Deleted caption");
                Ok(())
            }
            status => {
                warn!(video_id, language, status, "Deleting caption failed");
                Err(unexpected(&response))
            }
        }
    }

    async fn upload(
        &self,
        video_id: &str,
        language: &str,
        contents: Vec<u8>,
        filename: &str,
    ) -> Result<(), CaptionError> {
        let url = self.endpoint(&["videos", video_id, "captions", language]);
        info!(video_id, language, filename, bytes = contents.len(), "Uploading caption");

        let file = FilePart {
            field: CAPTION_FILE_FIELD.to_string(),
            filename: filename.to_string(),
            content_type: CAPTION_CONTENT_TYPE.to_string(),
            bytes: contents,
        };
        let request = HttpRequest::new(HttpMethod::Post, url).with_file(file);

        let response = self.transport.send(request).await?;
        match response.status {
            200 | 201 => {
                info!(video_id, language, "Uploaded caption");
                Ok(())
            }
            status => {
                warn!(video_id, language, status, "Uploading caption failed");
                Err(unexpected(&response))
            }
        }
    }
}

fn unexpected(response: &HttpResponse) -> CaptionError {
    CaptionError::UnexpectedStatus {
        status: response.status,
        body: response.body_text(),
    }
}

/// `pagination.pagesTotal`, or 1 when the response carries no pagination.
fn pages_total(data: &Value) -> u64 {
    data.pointer("/pagination/pagesTotal")
        .and_then(Value::as_u64)
        .unwrap_or(1)
}

/// Accepts `{"data": [...]}` as well as a bare array.
fn parse_tracks(data: &Value) -> Result<Vec<CaptionTrack>, CaptionError> {
    let items = data
        .get("data")
        .unwrap_or(data)
        .as_array()
        .ok_or_else(|| CaptionError::InvalidResponse("caption list is not an array".to_string()))?;

    let mut tracks = Vec::with_capacity(items.len());
    for item in items {
        match item.get("srclang").and_then(Value::as_str) {
            Some(language) => tracks.push(CaptionTrack {
                language: language.to_string(),
                metadata: item.clone(),
            }),
            None => warn!(item = %item, "Ignoring caption without srclang"),
        }
    }
    Ok(tracks)
}
