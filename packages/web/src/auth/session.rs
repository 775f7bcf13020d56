//! Session state shared across the app.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;

use crate::backend::{decode_claims, AuthUser, Session};
use crate::dom;
use crate::types::Profile;

const STORAGE_KEY: &str = "tradepost.session";

/// The current session plus the signed-in user's profile row. Cheap to
/// clone; all clones share state. Changes are announced with an
/// `auth-change` event on the document so the navbar can re-render.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    profile: Option<Profile>,
}

impl SessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                session,
                profile: None,
            })),
        }
    }

    /// Restore a persisted session, dropping it if it has expired.
    pub fn restore() -> Self {
        let now = Utc::now().timestamp();
        let session = read_persisted().filter(|s| s.is_live(now) && token_live(s, now));
        if session.is_none() {
            clear_persisted();
        }
        Self::new(session)
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.borrow().session.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().session.is_some()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.inner.borrow().profile.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.inner
            .borrow()
            .profile
            .as_ref()
            .map(Profile::is_admin)
            .unwrap_or(false)
    }

    /// Replace the session, persist it, and announce the change.
    pub fn set_session(&self, session: Option<Session>) {
        match &session {
            Some(s) => persist(s),
            None => clear_persisted(),
        }
        {
            let mut inner = self.inner.borrow_mut();
            if session.is_none() {
                inner.profile = None;
            }
            inner.session = session;
        }
        dom::dispatch("auth-change", "");
    }

    pub fn set_profile(&self, profile: Option<Profile>) {
        self.inner.borrow_mut().profile = profile;
        dom::dispatch("auth-change", "");
    }

    #[cfg(test)]
    pub(crate) fn for_tests(session: Option<Session>, profile: Option<Profile>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner { session, profile })),
        }
    }
}

/// The token's own `exp` claim must also agree the session is usable; the
/// persisted `expires_at` alone could have been edited by hand.
fn token_live(session: &Session, now: i64) -> bool {
    match decode_claims(&session.access_token) {
        Ok(claims) => claims.exp > now,
        Err(_) => false,
    }
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn read_persisted() -> Option<Session> {
    let raw = storage()?.get_item(STORAGE_KEY).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

fn persist(session: &Session) {
    if let (Some(store), Ok(raw)) = (storage(), serde_json::to_string(session)) {
        let _ = store.set_item(STORAGE_KEY, &raw);
    }
}

fn clear_persisted() {
    if let Some(store) = storage() {
        let _ = store.remove_item(STORAGE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: "refresh".into(),
            expires_at: i64::MAX,
            user: AuthUser {
                id: Uuid::nil(),
                email: "me@example.com".into(),
            },
        }
    }

    fn admin_profile() -> Profile {
        Profile {
            id: Uuid::nil(),
            display_name: "Admin".into(),
            bio: None,
            avatar_path: None,
            role: "admin".into(),
            banned: false,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn anonymous_store_has_no_user() {
        let store = SessionStore::for_tests(None, None);
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert!(store.user().is_none());
    }

    #[test]
    fn admin_requires_an_admin_profile() {
        let store = SessionStore::for_tests(Some(session()), None);
        assert!(store.is_authenticated());
        assert!(!store.is_admin());

        let store = SessionStore::for_tests(Some(session()), Some(admin_profile()));
        assert!(store.is_admin());
    }
}
