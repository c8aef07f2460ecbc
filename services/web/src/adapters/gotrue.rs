//! services/web/src/adapters/gotrue.rs
//!
//! This module contains the auth adapter, which implements the `AuthService`
//! port against Supabase's GoTrue endpoints. It keeps the current session,
//! shares its access token with the record adapter, publishes auth events,
//! and rotates the token shortly before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use job_tracker_core::domain::{AuthEvent, Session, SignUpOutcome, User};
use job_tracker_core::events::AuthEventBus;
use job_tracker_core::ports::{AuthEventStream, AuthService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::supabase::{check, transport_error, SupabaseClient};

/// How long before expiry the token is rotated.
const REFRESH_MARGIN_SECS: i64 = 60;
/// How often the refresh task looks again while nobody is signed in.
const IDLE_POLL_SECS: u64 = 30;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct GoTrueAuthAdapter {
    client: Arc<SupabaseClient>,
    session: RwLock<Option<Session>>,
    events: AuthEventBus,
}

impl GoTrueAuthAdapter {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            session: RwLock::new(None),
            events: AuthEventBus::default(),
        }
    }

    /// Stores `session`, hands its token to the shared client and announces it.
    async fn install(&self, session: Session, event: fn(Session) -> AuthEvent) {
        self.client
            .set_access_token(Some(session.access_token.clone()))
            .await;
        *self.session.write().await = Some(session.clone());
        self.events.publish(event(session));
    }

    async fn forget(&self) {
        let mut current = self.session.write().await;
        self.client.set_access_token(None).await;
        *current = None;
        drop(current);
        self.events.publish(AuthEvent::SignedOut);
    }

    async fn request_token(&self, grant_type: &str, body: &impl Serialize) -> PortResult<Session> {
        let request = self
            .client
            .http()
            .post(self.client.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .json(body);
        let response = self
            .client
            .authorize_with(request, &anon_bearer(&self.client))
            .send()
            .await
            .map_err(transport_error)?;

        let token: TokenResponse = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        token.to_domain(Utc::now())
    }

    /// Exchanges the refresh token for a new session and publishes `TokenRefreshed`.
    ///
    /// Returns `None` when the session was replaced or cleared while the
    /// request was in flight; the new token is then discarded.
    pub async fn refresh_session(&self) -> PortResult<Option<Session>> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(PortError::Unauthorized)?;

        let session = self
            .request_token("refresh_token", &RefreshRequest { refresh_token: &refresh_token })
            .await?;
        if self.install_refreshed(&refresh_token, session.clone()).await {
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }

    /// Installs `session` only if the stored session still holds `refresh_token`.
    async fn install_refreshed(&self, refresh_token: &str, session: Session) -> bool {
        let mut current = self.session.write().await;
        if current.as_ref().map(|s| s.refresh_token.as_str()) != Some(refresh_token) {
            return false;
        }
        self.client
            .set_access_token(Some(session.access_token.clone()))
            .await;
        *current = Some(session.clone());
        drop(current);
        self.events.publish(AuthEvent::TokenRefreshed(session));
        true
    }

    /// Keeps the session fresh until `cancel` fires.
    ///
    /// A refresh that fails ends the session: the user is signed out and must
    /// sign in again.
    pub async fn run_refresh_loop(self: Arc<Self>, cancel: CancellationToken) {
        info!("Token refresh task started.");
        loop {
            let wait = match self.session.read().await.as_ref() {
                Some(session) => refresh_delay(session.expires_at, Utc::now()),
                None => std::time::Duration::from_secs(IDLE_POLL_SECS),
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            let due = match self.session.read().await.as_ref() {
                Some(session) => refresh_delay(session.expires_at, Utc::now()).is_zero(),
                None => false,
            };
            if !due {
                continue;
            }

            match self.refresh_session().await {
                Ok(Some(session)) => info!("Rotated access token for user {}", session.user.id),
                Ok(None) => warn!("Session changed during token refresh, new token discarded"),
                Err(e) => {
                    error!("Token refresh failed, signing out: {:?}", e);
                    self.forget().await;
                }
            }
        }
        info!("Token refresh task stopped.");
    }
}

/// GoTrue's token endpoint takes the anon key as bearer, never a user token.
fn anon_bearer(client: &SupabaseClient) -> String {
    client.anon_key().to_string()
}

/// Time left until the token should be rotated, zero if it is already due.
fn refresh_delay(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    (expires_at - Duration::seconds(REFRESH_MARGIN_SECS) - now)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct UserRecord {
    id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    expires_at: Option<i64>,
    user: UserRecord,
}
impl TokenResponse {
    fn to_domain(self, now: DateTime<Utc>) -> PortResult<Session> {
        let expires_at = match self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        {
            Some(at) => at,
            None => Duration::try_seconds(self.expires_in)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .ok_or_else(|| {
                    PortError::Unexpected(format!(
                        "Token lifetime out of range: {}s",
                        self.expires_in
                    ))
                })?,
        };
        Ok(Session {
            user: self.user.to_domain(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

/// Sign-up answers with a full session when email confirmation is off,
/// and with the bare user when it is on.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserRecord),
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for GoTrueAuthAdapter {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<SignUpOutcome> {
        let request = self
            .client
            .http()
            .post(self.client.auth_url("signup"))
            .json(&Credentials { email, password });
        let response = self
            .client
            .authorize_with(request, &anon_bearer(&self.client))
            .send()
            .await
            .map_err(transport_error)?;

        let body: SignUpResponse = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        match body {
            SignUpResponse::Session(token) => {
                let session = token.to_domain(Utc::now())?;
                self.install(session.clone(), AuthEvent::SignedIn).await;
                Ok(SignUpOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                })
            }
            SignUpResponse::User(user) => {
                info!("Account {} awaits email confirmation", user.id);
                Ok(SignUpOutcome {
                    user: Some(user.to_domain()),
                    session: None,
                })
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> PortResult<Session> {
        let session = self
            .request_token("password", &Credentials { email, password })
            .await?;
        self.install(session.clone(), AuthEvent::SignedIn).await;
        Ok(session)
    }

    async fn sign_out(&self) -> PortResult<()> {
        let Some(token) = self.client.access_token().await else {
            self.forget().await;
            return Ok(());
        };

        let request = self.client.http().post(self.client.auth_url("logout"));
        let response = self
            .client
            .authorize_with(request, &token)
            .send()
            .await
            .map_err(transport_error)?;

        match check(response).await {
            // An expired or revoked token means the backend already forgot the session.
            Ok(_) | Err(PortError::Unauthorized) => {
                self.forget().await;
                Ok(())
            }
            Err(e) => {
                warn!("Backend refused sign-out: {:?}", e);
                Err(e)
            }
        }
    }

    async fn get_session(&self) -> PortResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    fn subscribe(&self) -> AuthEventStream {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn token_response_prefers_absolute_expiry() {
        let json = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1714564800,
            "refresh_token": "rt",
            "user": { "id": "0e3c2a1b-9d8c-4b7a-8e6f-5d4c3b2a1f0e", "email": "dev@example.com", "aud": "authenticated" }
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let session = token.to_domain(Utc::now()).unwrap();
        assert_eq!(session.expires_at.timestamp(), 1_714_564_800);
        assert_eq!(session.user.email.as_deref(), Some("dev@example.com"));
        assert_eq!(session.refresh_token, "rt");
    }

    #[test]
    fn token_response_falls_back_to_relative_expiry() {
        let json = r#"{
            "access_token": "at",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": { "id": "0e3c2a1b-9d8c-4b7a-8e6f-5d4c3b2a1f0e" }
        }"#;
        let now = Utc::now();
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            token.to_domain(now).unwrap().expires_at,
            now + Duration::seconds(3600)
        );
    }

    #[test]
    fn sign_up_without_session_parses_as_user() {
        let json = r#"{ "id": "0e3c2a1b-9d8c-4b7a-8e6f-5d4c3b2a1f0e", "email": "new@example.com", "confirmation_sent_at": "2024-05-01T12:00:00Z" }"#;
        let body: SignUpResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(body, SignUpResponse::User(user) if user.email.as_deref() == Some("new@example.com")));
    }

    #[test]
    fn refresh_is_due_a_minute_before_expiry() {
        let now = Utc::now();
        assert_eq!(
            refresh_delay(now + Duration::seconds(600), now),
            std::time::Duration::from_secs(540)
        );
        assert!(refresh_delay(now + Duration::seconds(30), now).is_zero());
        assert!(refresh_delay(now - Duration::seconds(30), now).is_zero());
    }

    #[tokio::test]
    async fn refresh_without_session_is_unauthorized() {
        let client = Arc::new(SupabaseClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "anon",
        ));
        let adapter = GoTrueAuthAdapter::new(client);
        assert_eq!(adapter.refresh_session().await.unwrap_err(), PortError::Unauthorized);
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let json = r#"{
            "access_token": "at",
            "expires_in": 9223372036854775807,
            "refresh_token": "rt",
            "user": { "id": "0e3c2a1b-9d8c-4b7a-8e6f-5d4c3b2a1f0e" }
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            token.to_domain(Utc::now()),
            Err(PortError::Unexpected(msg)) if msg.contains("out of range")
        ));
    }

    fn session_with_refresh(refresh_token: &str) -> Session {
        Session {
            user: User {
                id: Uuid::new_v4(),
                email: None,
            },
            access_token: format!("access-{}", refresh_token),
            refresh_token: refresh_token.to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn offline_adapter() -> (Arc<SupabaseClient>, GoTrueAuthAdapter) {
        let client = Arc::new(SupabaseClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "anon",
        ));
        (client.clone(), GoTrueAuthAdapter::new(client))
    }

    #[tokio::test]
    async fn refreshed_token_is_discarded_after_sign_out() {
        let (client, adapter) = offline_adapter();
        adapter
            .install(session_with_refresh("old"), AuthEvent::SignedIn)
            .await;
        adapter.forget().await;

        let installed = adapter
            .install_refreshed("old", session_with_refresh("new"))
            .await;
        assert!(!installed);
        assert!(adapter.session.read().await.is_none());
        assert_eq!(client.access_token().await, None);
    }

    #[tokio::test]
    async fn refreshed_token_is_installed_while_session_unchanged() {
        let (client, adapter) = offline_adapter();
        adapter
            .install(session_with_refresh("old"), AuthEvent::SignedIn)
            .await;
        let mut events = adapter.subscribe();

        let installed = adapter
            .install_refreshed("old", session_with_refresh("new"))
            .await;
        assert!(installed);
        assert_eq!(client.access_token().await.as_deref(), Some("access-new"));
        assert!(matches!(
            events.next().await,
            Some(AuthEvent::TokenRefreshed(s)) if s.refresh_token == "new"
        ));
    }
}
