use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::domain::{ClientStorageSnapshot, LoginForm, Session, SessionId, SessionUser};
use super::SessionError;

/// Storage abstraction for issued sessions.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: Session) -> Result<(), SessionStoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;
    /// Returns whether a session was removed.
    fn remove(&self, id: &SessionId) -> Result<bool, SessionStoreError>;
    /// Drop every session that is no longer active at `now`, returning how many went.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id(now: DateTime<Utc>) -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{:x}-{id:06}", now.timestamp_millis()))
}

fn next_user_id() -> String {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("user-{id:06}")
}

/// Creates, looks up, and invalidates sessions.
pub struct SessionService<S> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S> SessionService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: Arc<S>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn login(&self, form: &LoginForm, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let credentials = form.validate()?;
        let user = SessionUser {
            id: next_user_id(),
            name: credentials.name,
            email: credentials.email,
            role: credentials.role,
        };
        self.issue(user, now)
    }

    /// Rebuild a session from values a client persisted earlier.
    pub fn restore(
        &self,
        snapshot: &ClientStorageSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Session, SessionError> {
        match snapshot.decode() {
            Ok(Some(user)) => self.issue(user, now),
            Ok(None) => Err(SessionError::NotAuthenticated),
            Err(err) => {
                warn!(error = %err, "discarding unreadable stored session");
                Err(err)
            }
        }
    }

    /// Resolve a bearer token into an active session. Expired sessions are
    /// dropped from the store on first sight.
    pub fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::NotAuthenticated);
        }

        let id = SessionId(token.to_string());
        let session = self
            .store
            .fetch(&id)?
            .ok_or(SessionError::UnknownSession)?;

        if !session.is_active(now) {
            self.store.remove(&id)?;
            debug!(session_id = %id.0, "session expired");
            return Err(SessionError::Expired);
        }

        Ok(session)
    }

    pub fn logout(&self, token: &str) -> Result<(), SessionError> {
        let id = SessionId(token.trim().to_string());
        if self.store.remove(&id)? {
            info!(session_id = %id.0, "session closed");
            Ok(())
        } else {
            Err(SessionError::UnknownSession)
        }
    }

    /// Sessions only reach the store through here, so sweeping before each
    /// insert bounds the store to sessions still live at the latest issue time.
    fn issue(&self, user: SessionUser, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let purged = self.store.purge_expired(now)?;
        if purged > 0 {
            debug!(purged, "expired sessions swept");
        }

        let session = Session {
            id: next_session_id(now),
            user,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.store.insert(session.clone())?;
        info!(
            user_id = %session.user.id,
            role = session.user.role.label(),
            "session opened"
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::domain::{AuthMode, UserRole};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        sessions: Mutex<HashMap<SessionId, Session>>,
    }

    impl MemoryStore {
        fn len(&self) -> usize {
            self.sessions.lock().expect("store mutex poisoned").len()
        }
    }

    impl SessionStore for MemoryStore {
        fn insert(&self, session: Session) -> Result<(), SessionStoreError> {
            let mut guard = self.sessions.lock().expect("store mutex poisoned");
            if guard.contains_key(&session.id) {
                return Err(SessionStoreError::Conflict);
            }
            guard.insert(session.id.clone(), session);
            Ok(())
        }

        fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
            Ok(self
                .sessions
                .lock()
                .expect("store mutex poisoned")
                .get(id)
                .cloned())
        }

        fn remove(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
            Ok(self
                .sessions
                .lock()
                .expect("store mutex poisoned")
                .remove(id)
                .is_some())
        }

        fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
            let mut guard = self.sessions.lock().expect("store mutex poisoned");
            let before = guard.len();
            guard.retain(|_, session| session.is_active(now));
            Ok(before - guard.len())
        }
    }

    struct OfflineStore;

    impl SessionStore for OfflineStore {
        fn insert(&self, _session: Session) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::Unavailable("store offline".to_string()))
        }

        fn fetch(&self, _id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
            Err(SessionStoreError::Unavailable("store offline".to_string()))
        }

        fn remove(&self, _id: &SessionId) -> Result<bool, SessionStoreError> {
            Err(SessionStoreError::Unavailable("store offline".to_string()))
        }

        fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
            Err(SessionStoreError::Unavailable("store offline".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn service() -> (SessionService<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (SessionService::new(store.clone(), Duration::hours(12)), store)
    }

    fn login_form() -> LoginForm {
        LoginForm {
            email: "asha@example.com".to_string(),
            password: "secret".to_string(),
            name: "Asha Rao".to_string(),
            mode: AuthMode::Signup,
            role: Some(UserRole::Lender),
        }
    }

    #[test]
    fn login_issues_session_with_ttl() {
        let (service, store) = service();
        let session = service.login(&login_form(), now()).expect("login");

        assert_eq!(session.user.email, "asha@example.com");
        assert_eq!(session.user.role, UserRole::Lender);
        assert_eq!(session.expires_at - session.created_at, Duration::hours(12));
        assert!(session.id.0.starts_with("sess-"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn authenticate_returns_active_session() {
        let (service, _) = service();
        let session = service.login(&login_form(), now()).expect("login");

        let found = service
            .authenticate(&session.id.0, now() + Duration::hours(1))
            .expect("active session");
        assert_eq!(found, session);
    }

    #[test]
    fn expired_session_is_rejected_and_dropped() {
        let (service, store) = service();
        let session = service.login(&login_form(), now()).expect("login");

        let err = service
            .authenticate(&session.id.0, now() + Duration::hours(12))
            .expect_err("expired");
        assert!(matches!(err, SessionError::Expired));
        assert_eq!(store.len(), 0);

        let err = service
            .authenticate(&session.id.0, now())
            .expect_err("gone after expiry");
        assert!(matches!(err, SessionError::UnknownSession));
    }

    #[test]
    fn logout_invalidates_session() {
        let (service, _) = service();
        let session = service.login(&login_form(), now()).expect("login");

        service.logout(&session.id.0).expect("logout");
        let err = service
            .authenticate(&session.id.0, now())
            .expect_err("logged out");
        assert!(matches!(err, SessionError::UnknownSession));

        let err = service.logout(&session.id.0).expect_err("second logout");
        assert!(matches!(err, SessionError::UnknownSession));
    }

    #[test]
    fn blank_token_is_not_authenticated() {
        let (service, _) = service();
        let err = service.authenticate("  ", now()).expect_err("blank");
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[test]
    fn restore_reissues_session_for_stored_user() {
        let (service, _) = service();
        let user = SessionUser {
            id: "user-777".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            role: UserRole::Worker,
        };
        let snapshot = ClientStorageSnapshot::signed_in(&user).expect("snapshot");

        let session = service.restore(&snapshot, now()).expect("restored");
        assert_eq!(session.user, user);
    }

    #[test]
    fn restore_rejects_corrupt_user_record() {
        let (service, store) = service();
        let snapshot = ClientStorageSnapshot {
            is_authenticated: Some("true".to_string()),
            user: Some("{not json".to_string()),
        };

        let err = service.restore(&snapshot, now()).expect_err("corrupt");
        assert!(matches!(err, SessionError::CorruptStoredUser(_)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn restore_without_flag_is_signed_out() {
        let (service, _) = service();
        let err = service
            .restore(&ClientStorageSnapshot::default(), now())
            .expect_err("signed out");
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[test]
    fn issuing_a_session_evicts_expired_ones() {
        let store = Arc::new(MemoryStore::default());
        let service = SessionService::new(store.clone(), Duration::minutes(1));
        let user = SessionUser {
            id: "user-900".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            role: UserRole::Worker,
        };
        let snapshot = ClientStorageSnapshot::signed_in(&user).expect("snapshot");

        let stale_at = now() - Duration::days(1);
        for _ in 0..500 {
            service.restore(&snapshot, stale_at).expect("restored");
        }
        assert_eq!(store.len(), 500);

        let fresh = service.restore(&snapshot, now()).expect("restored");
        assert_eq!(store.len(), 1);
        assert_eq!(
            service.authenticate(&fresh.id.0, now()).expect("live"),
            fresh
        );
    }

    #[test]
    fn sessions_still_live_survive_the_sweep() {
        let (service, store) = service();
        let first = service.login(&login_form(), now()).expect("login");
        service
            .login(&login_form(), now() + Duration::hours(11))
            .expect("second login");

        assert_eq!(store.len(), 2);
        service
            .authenticate(&first.id.0, now() + Duration::hours(11))
            .expect("first still active");
    }

    #[test]
    fn store_outage_is_reported() {
        let service = SessionService::new(Arc::new(OfflineStore), Duration::hours(1));
        let err = service.login(&login_form(), now()).expect_err("offline");
        assert!(matches!(err, SessionError::Store(SessionStoreError::Unavailable(_))));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
