use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::{BitwireError, Result};
use crate::models::responses::ApiErrorBody;

/// HTTP transport for the Bitwire API
/// Joins paths onto the mode's base URL and classifies every response
pub struct BitwireHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Base URL, always ending with `/`
    base_url: String,
}

impl BitwireHttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(concat!("bitwire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BitwireError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        resource: &'static str,
    ) -> Result<T> {
        let request = Self::authorize(self.client.get(self.url(path)), bearer);
        self.execute(request, resource).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        resource: &'static str,
    ) -> Result<T> {
        let request = Self::authorize(self.client.delete(self.url(path)), bearer);
        self.execute(request, resource).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
        resource: &'static str,
    ) -> Result<T> {
        let request = Self::authorize(self.client.post(self.url(path)).json(body), bearer);
        self.execute(request, resource).await
    }

    /// POST a form-encoded body (token endpoint)
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
        resource: &'static str,
    ) -> Result<T> {
        let request = self.client.post(self.url(path)).form(form);
        self.execute(request, resource).await
    }

    /// Send the request once and decode the body
    /// Errors are never retried here
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &'static str,
    ) -> Result<T> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_error"
                } else {
                    "unknown"
                };
                tracing::warn!(
                    error_kind = error_kind,
                    error = %e,
                    url = %url,
                    "HTTP request error"
                );
                return Err(BitwireError::Transport(e));
            }
        };

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, bytes = body.len(), "Received HTTP response");

        let result = decode(status, &body, resource);
        if let Err(ref e) = result {
            tracing::warn!(status = status.as_u16(), url = %url, error = %e, "Bitwire request failed");
        }
        result
    }
}

/// Classify a response body
///
/// An error payload wins over the HTTP status; a non-success status without
/// a payload is reported as such; only then is the body decoded as `T`.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &str, resource: &'static str) -> Result<T> {
    if let Ok(error_body) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(err) = error_body.into_error(status.as_u16()) {
            return Err(err);
        }
    }

    if !status.is_success() {
        return Err(BitwireError::HttpStatus {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|source| BitwireError::Decode { resource, source })
}

fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::responses::BanksResponse;

    #[test]
    fn test_url_joining() {
        let client = BitwireHttpClient::new(
            "http://localhost:1234/api/v1",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:1234/api/v1/");
        assert_eq!(client.url("rates/fx"), "http://localhost:1234/api/v1/rates/fx");
        assert_eq!(client.url("/banks"), "http://localhost:1234/api/v1/banks");
    }

    #[test]
    fn test_decode_success() {
        let res: BanksResponse = decode(
            StatusCode::OK,
            r#"{"code": 200, "banks": [{"id": 1, "name": "Shinhan"}]}"#,
            "banks",
        )
        .unwrap();
        assert_eq!(res.code, 200);
        assert_eq!(res.banks[0].name, "Shinhan");
    }

    #[test]
    fn test_decode_api_error_with_ok_status() {
        let err = decode::<BanksResponse>(
            StatusCode::OK,
            r#"{"code": 401, "errorType": "Unauthorized", "message": "Invalid token."}"#,
            "banks",
        )
        .unwrap_err();
        assert!(matches!(err, BitwireError::Api { status: 200, .. }));
        assert_eq!(err.to_string(), "Unauthorized: Invalid token.");
    }

    #[test]
    fn test_decode_status_without_payload() {
        let err =
            decode::<BanksResponse>(StatusCode::BAD_GATEWAY, "<html>oops</html>", "banks").unwrap_err();
        match err {
            BitwireError::HttpStatus { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = decode::<BanksResponse>(StatusCode::OK, r#"{"code": 200, "banks": "none"}"#, "banks")
            .unwrap_err();
        assert!(matches!(err, BitwireError::Decode { resource: "banks", .. }));

        let err = decode::<BanksResponse>(StatusCode::OK, r#"{"code": 200}"#, "banks").unwrap_err();
        assert!(matches!(err, BitwireError::Decode { .. }));
    }
}
