//! Stored shopper session: the bearer token and the signed-in profile.
//!
//! The token lives under its own key as a plain string so the API client can
//! read it without decoding the whole profile.

use serde::{Deserialize, Serialize};

use crate::{Cache, CacheError};

/// Key holding the JSON session profile.
pub const SESSION_KEY: &str = "session";
/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";

const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Profile of the signed-in user as returned by the login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SessionProfile {
    /// Name to print on orders: `nombre`, falling back to `username`.
    pub fn display_name(&self) -> Option<&str> {
        [self.nombre.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

/// Session storage on top of a [`Cache`].
///
/// Reads never fail: a missing or unreadable profile is treated as signed
/// out.
#[derive(Debug, Clone)]
pub struct Session {
    cache: Cache,
}

impl Session {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        match self.cache.get_raw(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session token");
                None
            }
        }
    }

    /// Stored profile, if any.
    pub fn profile(&self) -> Option<SessionProfile> {
        match self.cache.get::<SessionProfile>(SESSION_KEY) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session profile");
                None
            }
        }
    }

    /// Persist a profile and mirror its token under [`TOKEN_KEY`].
    pub fn save(&self, profile: &SessionProfile) -> Result<(), CacheError> {
        self.cache.set(SESSION_KEY, profile)?;
        match profile.token.as_deref() {
            Some(token) if !token.is_empty() => self.cache.set_raw(TOKEN_KEY, token),
            _ => self.cache.delete(TOKEN_KEY),
        }
    }

    /// Remove both the profile and the token.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(SESSION_KEY)?;
        self.cache.delete(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(token: Option<&str>) -> SessionProfile {
        SessionProfile {
            token: token.map(String::from),
            username: Some("cata".into()),
            roles: vec!["ROLE_USER".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_save_mirrors_token() {
        let session = Session::new(Cache::in_memory());
        session.save(&profile(Some("jwt-1"))).unwrap();

        assert_eq!(session.token().as_deref(), Some("jwt-1"));
        assert_eq!(session.profile().unwrap().username.as_deref(), Some("cata"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_save_without_token_drops_old_token() {
        let session = Session::new(Cache::in_memory());
        session.save(&profile(Some("jwt-1"))).unwrap();
        session.save(&profile(None)).unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_clear() {
        let session = Session::new(Cache::in_memory());
        session.save(&profile(Some("jwt-1"))).unwrap();
        session.clear().unwrap();

        assert_eq!(session.token(), None);
        assert!(session.profile().is_none());
    }

    #[test]
    fn test_corrupt_profile_reads_as_signed_out() {
        let cache = Cache::in_memory();
        cache.set_raw(SESSION_KEY, "not-json").unwrap();
        let session = Session::new(cache);
        assert!(session.profile().is_none());
    }

    #[test]
    fn test_display_name_and_roles() {
        let mut p = profile(None);
        assert_eq!(p.display_name(), Some("cata"));
        p.nombre = Some("Catalina Rojas".into());
        assert_eq!(p.display_name(), Some("Catalina Rojas"));
        p.nombre = Some("  ".into());
        assert_eq!(p.display_name(), Some("cata"));

        assert!(!p.is_admin());
        p.roles.push("ROLE_ADMIN".into());
        assert!(p.is_admin());
    }
}
