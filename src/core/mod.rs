pub mod middleware;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
    pub errors: Option<Vec<FirebaseSubError>>,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseSubError {
    pub message: String,
    pub domain: Option<String>,
    pub reason: Option<String>,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        format!("{} (code: {})", self.error.message, self.error.code)
    }

    /// The leading error code of the message, e.g. `WEAK_PASSWORD` for
    /// `"WEAK_PASSWORD : Password should be at least 6 characters"`.
    pub fn error_code(&self) -> &str {
        self.error
            .message
            .split([' ', ':'])
            .next()
            .unwrap_or_default()
    }
}

/// Reads the body of a failed response into a displayable message.
///
/// Google APIs answer with `{"error": {"code", "message", "status"}}`; anything else
/// is reported with the HTTP status and the raw body.
pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<FirebaseErrorResponse>(&text) {
        Ok(error_resp) => error_resp.display_message(),
        Err(_) if text.trim().is_empty() => format!("{}: {}", default_msg, status),
        Err(_) => format!("{} {}: {}", default_msg, status, text),
    };
    tracing::error!(%status, %message, "request rejected");
    message
}

/// Percent-encodes a single path segment (slashes included).
pub(crate) fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strips_detail() {
        let resp: FirebaseErrorResponse = serde_json::from_value(serde_json::json!({
            "error": {
                "code": 400,
                "message": "WEAK_PASSWORD : Password should be at least 6 characters"
            }
        }))
        .unwrap();
        assert_eq!(resp.error_code(), "WEAK_PASSWORD");
        assert_eq!(
            resp.display_message(),
            "WEAK_PASSWORD : Password should be at least 6 characters (code: 400)"
        );
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("images/a b.png"), "images%2Fa%20b.png");
        assert_eq!(encode_path_segment("plain.txt"), "plain.txt");
    }
}
