//! crates/job_tracker_core/src/session.rs
//!
//! The session store: who is signed in, and with which token. It has no logic
//! of its own beyond mirroring the auth service, which pushes changes through
//! its subscription.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::domain::{AuthEvent, Session, SignUpOutcome, User};
use crate::ports::{AuthService, NotificationService, PortResult};

#[derive(Debug, Clone, PartialEq)]
struct SessionState {
    session: Option<Session>,
    loading: bool,
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    notifier: Arc<dyn NotificationService>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthService>, notifier: Arc<dyn NotificationService>) -> Self {
        Self {
            auth,
            notifier,
            state: RwLock::new(SessionState {
                session: None,
                loading: true,
            }),
        }
    }

    /// Loads whatever session the auth service already holds.
    pub async fn init(&self) {
        match self.auth.get_session().await {
            Ok(Some(session)) => self.set_auth(session).await,
            Ok(None) => {}
            Err(e) => error!("Failed to load the initial session: {:?}", e),
        }
        self.state.write().await.loading = false;
    }

    pub async fn set_auth(&self, session: Session) {
        self.state.write().await.session = Some(session);
    }

    pub async fn clear_auth(&self) {
        self.state.write().await.session = None;
    }

    /// Applies one event from the auth subscription.
    pub async fn handle_event(&self, event: AuthEvent) {
        let mut state = self.state.write().await;
        match event {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                state.session = Some(session);
            }
            AuthEvent::SignedOut => state.session = None,
        }
        state.loading = false;
    }

    //-------------------------------------------------------------------------------------
    // Auth actions
    //-------------------------------------------------------------------------------------
    // The session itself arrives through the subscription; these only report the outcome.

    pub async fn sign_up(&self, email: &str, password: &str) -> PortResult<SignUpOutcome> {
        match self.auth.sign_up(email, password).await {
            Ok(outcome) => {
                if outcome.user.is_some() {
                    info!("Created account for {}", email);
                    self.notifier.success("Account created successfully!");
                }
                Ok(outcome)
            }
            Err(e) => {
                error!("Sign-up failed for {}: {:?}", email, e);
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> PortResult<Session> {
        match self.auth.sign_in_with_password(email, password).await {
            Ok(session) => {
                info!("User {} signed in", session.user.id);
                self.notifier.success("Signed in successfully!");
                Ok(session)
            }
            Err(e) => {
                error!("Sign-in failed for {}: {:?}", email, e);
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> PortResult<()> {
        match self.auth.sign_out().await {
            Ok(()) => {
                self.notifier.success("Signed out successfully!");
                Ok(())
            }
            Err(e) => {
                error!("Sign-out failed: {:?}", e);
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    //-------------------------------------------------------------------------------------
    // Accessors
    //-------------------------------------------------------------------------------------

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.session.as_ref().map(|s| s.user.clone())
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryAuthService, NoticeKind, RecordingNotifier};
    use crate::ports::PortError;
    use futures::StreamExt;

    fn fixture() -> (Arc<MemoryAuthService>, Arc<RecordingNotifier>, SessionStore) {
        let auth = Arc::new(MemoryAuthService::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let store = SessionStore::new(auth.clone(), notifier.clone());
        (auth, notifier, store)
    }

    #[tokio::test]
    async fn starts_loading_until_init() {
        let (_, _, store) = fixture();
        assert!(store.is_loading().await);
        store.init().await;
        assert!(!store.is_loading().await);
        assert!(store.user().await.is_none());
    }

    #[tokio::test]
    async fn init_picks_up_existing_session() {
        let (auth, _, store) = fixture();
        let outcome = auth.sign_up("dev@example.com", "s3cret-pass").await.unwrap();

        store.init().await;

        assert_eq!(store.session().await, outcome.session);
    }

    #[tokio::test]
    async fn events_drive_the_session() {
        let (auth, _, store) = fixture();
        let mut events = auth.subscribe();
        auth.sign_up("dev@example.com", "s3cret-pass").await.unwrap();

        let signed_in = events.next().await.unwrap();
        store.handle_event(signed_in).await;
        let user = store.user().await.unwrap();
        assert_eq!(user.email.as_deref(), Some("dev@example.com"));
        assert!(!store.is_loading().await);

        let first_token = store.access_token().await.unwrap();
        auth.rotate_tokens().await.unwrap();
        store.handle_event(events.next().await.unwrap()).await;
        assert_ne!(store.access_token().await.unwrap(), first_token);
        assert_eq!(store.user().await.unwrap().id, user.id);

        auth.sign_out().await.unwrap();
        store.handle_event(events.next().await.unwrap()).await;
        assert!(store.session().await.is_none());
    }

    #[tokio::test]
    async fn sign_in_failure_surfaces_backend_message() {
        let (_, notifier, store) = fixture();

        let err = store.sign_in("nobody@example.com", "wrong").await.unwrap_err();

        assert_eq!(err, PortError::Rejected("Invalid login credentials".to_string()));
        assert_eq!(
            notifier.last(),
            Some((NoticeKind::Error, "Invalid login credentials".to_string()))
        );
    }

    #[tokio::test]
    async fn auth_actions_notify_success() {
        let (_, notifier, store) = fixture();
        store.sign_up("dev@example.com", "s3cret-pass").await.unwrap();
        store.sign_in("dev@example.com", "s3cret-pass").await.unwrap();
        store.sign_out().await.unwrap();

        let messages: Vec<_> = notifier.notices().into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            messages,
            vec![
                "Account created successfully!",
                "Signed in successfully!",
                "Signed out successfully!"
            ]
        );
    }
}
