//! Session token storage on top of a key-value store

use std::sync::Arc;

use common::{KeyValueStore, StoreResult};
use tracing::{info, warn};

use crate::models::{AuthResponse, UserProfile};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Token store holding the access token, refresh token and cached user
///
/// Writes go straight to the underlying store. Tokens and user are written
/// by separate calls, so a session may hold tokens without a cached user;
/// callers treat a missing user as signed out.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    /// Create a new token store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Get the access token, if any
    pub fn get_token(&self) -> StoreResult<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// Get the refresh token, if any
    pub fn get_refresh_token(&self) -> StoreResult<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Store a new token pair
    pub fn set_tokens(&self, access: &str, refresh: &str) -> StoreResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, access)?;
        self.store.set(REFRESH_TOKEN_KEY, refresh)?;
        Ok(())
    }

    /// Destroy the session: both tokens and the cached user
    pub fn clear_tokens(&self) -> StoreResult<()> {
        info!("Clearing stored session");
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    /// Get the cached user profile
    ///
    /// An entry that no longer parses is reported as absent.
    pub fn get_user(&self) -> StoreResult<Option<UserProfile>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Ignoring unreadable cached user: {}", e);
                Ok(None)
            }
        }
    }

    /// Cache the user profile
    pub fn set_user(&self, user: &UserProfile) -> StoreResult<()> {
        let raw = serde_json::to_string(user).map_err(common::StoreError::Corrupted)?;
        self.store.set(USER_KEY, &raw)
    }

    /// True when an access token is stored
    pub fn has_session(&self) -> StoreResult<bool> {
        Ok(self.get_token()?.is_some())
    }

    /// Apply the session effect of a login or registration response
    ///
    /// Tokens and user are persisted only when the response carries tokens.
    /// Returns whether a session was established.
    pub fn apply_auth(&self, response: &AuthResponse) -> StoreResult<bool> {
        let Some(tokens) = &response.tokens else {
            info!(
                "No tokens issued for user: {}, session unchanged",
                response.user.username
            );
            return Ok(false);
        };

        self.set_tokens(&tokens.access, &tokens.refresh)?;
        self.set_user(&response.user)?;
        info!("Session stored for user: {}", response.user.username);
        Ok(true)
    }
}
