//! Shared response handling for the API client

use super::ApiError;
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// Turn a failed response into [`ApiError::Status`]
///
/// Prefers the server's `{"message": ...}` body, then the raw text, then the
/// status reason phrase.
pub async fn extract_api_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .ok()
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Deserialize JSON response with proper error handling
pub async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::DeserializeFailed(e.to_string()))
}

/// Build an endpoint path from segments, percent-encoding each one
///
/// `endpoint(&["boards", id, "columns"])` gives `/boards/<id>/columns`; an id
/// holding `/`, `?` or `#` stays inside its own segment.
pub fn endpoint(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
        path
    })
}
