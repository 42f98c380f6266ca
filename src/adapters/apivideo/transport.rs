use crate::config::SyncConfig;
use crate::error::TransportError;
use crate::ports::credentials::CredentialPort;
use crate::ports::transport::{HttpMethod, HttpRequest, HttpResponse, TransportPort};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// reqwest-backed transport that attaches a bearer token to every request.
#[derive(Clone)]
pub struct ReqwestTransport<A> {
    client: reqwest::Client,
    credentials: A,
}

impl<A> ReqwestTransport<A>
where
    A: CredentialPort,
{
    pub fn new(config: &SyncConfig, credentials: A) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
        })
    }
}

#[async_trait]
impl<A> TransportPort for ReqwestTransport<A>
where
    A: CredentialPort,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let token = self.credentials.bearer_token().await?;

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(file) = request.file {
            let part = Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str(&file.content_type)
                .map_err(|e| TransportError::Request(format!("Invalid content type: {}", e)))?;
            builder = builder.multipart(Form::new().part(file.field, part));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse {
            status,
            data: decode_body(&text),
        })
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::ports::credentials::MockCredentialPort;
    use serde_json::json;

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
        assert_eq!(decode_body(r#"{"data":[]}"#), json!({"data": []}));
        assert_eq!(
            decode_body("Bad Gateway"),
            Value::String("Bad Gateway".to_string())
        );
    }

    #[tokio::test]
    async fn test_auth_failure_stops_before_request() {
        let mut credentials = MockCredentialPort::new();
        credentials
            .expect_bearer_token()
            .times(1)
            .returning(|| Err(AuthError::MissingApiKey));
        let transport = ReqwestTransport::new(&SyncConfig::default(), credentials).unwrap();

        let result = transport
            .send(HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/videos"))
            .await;

        assert!(matches!(
            result,
            Err(TransportError::Auth(AuthError::MissingApiKey))
        ));
    }
}
