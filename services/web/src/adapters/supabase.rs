//! services/web/src/adapters/supabase.rs
//!
//! The HTTP plumbing shared by the Supabase adapters: endpoint URLs, the
//! `apikey`/`Authorization` headers, and translation of error responses
//! into `PortError`s.

use job_tracker_core::ports::PortError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::warn;

/// A connection to one Supabase project.
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    /// The signed-in user's access token. Requests fall back to the anon key without it.
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    pub fn new(http: Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: RwLock::new(None),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// `{base}/rest/v1/{table}`
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `{base}/auth/v1/{path}`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Adds the project key and the bearer token every Supabase endpoint expects.
    pub async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .access_token()
            .await
            .unwrap_or_else(|| self.anon_key.clone());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Adds the project key with the given bearer token.
    pub fn authorize_with(&self, request: RequestBuilder, bearer: &str) -> RequestBuilder {
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }
}

//=========================================================================================
// Error Translation
//=========================================================================================

/// The fields Supabase services use to describe a failure. PostgREST sends
/// `message`, GoTrue sends `msg` or `error_description`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Maps a status code and raw body to a `PortError`.
pub fn port_error(status: StatusCode, body: &str) -> PortError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        // PostgREST answers 406 when a single-object response matched no rows.
        StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => PortError::NotFound(message),
        s if s.is_client_error() => PortError::Rejected(message),
        _ => PortError::Unexpected(format!("{}: {}", status, message)),
    }
}

/// Passes successful responses through and turns every other one into a `PortError`.
pub async fn check(response: Response) -> Result<Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read the {} response body: {}", status, e);
            String::new()
        }
    };
    Err(port_error(status, &body))
}

pub fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let client = SupabaseClient::new(Client::new(), "https://demo.supabase.co/", "anon");
        assert_eq!(
            client.rest_url("job_applications"),
            "https://demo.supabase.co/rest/v1/job_applications"
        );
        assert_eq!(
            client.auth_url("token"),
            "https://demo.supabase.co/auth/v1/token"
        );
    }

    #[test]
    fn auth_rejections_keep_backend_message() {
        let err = port_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err, PortError::Rejected("Invalid login credentials".to_string()));
    }

    #[test]
    fn empty_body_falls_back_to_canonical_reason() {
        assert_eq!(
            port_error(StatusCode::BAD_GATEWAY, ""),
            PortError::Unexpected("502 Bad Gateway: Bad Gateway".to_string())
        );
        assert_eq!(
            port_error(StatusCode::CONFLICT, ""),
            PortError::Rejected("Conflict".to_string())
        );
    }

    #[test]
    fn status_codes_map_to_port_errors() {
        assert_eq!(port_error(StatusCode::UNAUTHORIZED, ""), PortError::Unauthorized);
        assert!(matches!(
            port_error(StatusCode::NOT_ACCEPTABLE, r#"{"message":"JSON object requested, multiple (or no) rows returned"}"#),
            PortError::NotFound(_)
        ));
        assert!(matches!(
            port_error(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            PortError::Unexpected(msg) if msg.contains("Internal Server Error")
        ));
    }
}
