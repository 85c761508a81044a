//! Sign-in, sign-up, and profile resolution
//!
//! A session only becomes usable once it resolves to a `Profile`. The
//! configured admin account short-circuits to an admin profile without
//! touching the profiles table; every other account gets its stored
//! profile, lazily created from signup metadata when the row is
//! missing. A session whose profile cannot be resolved is signed out
//! rather than left half-usable.

use crate::policy;
use mix_client::{AuthEvent, Backend, Session};
use serde_json::json;
use shared::models::{NewProfile, Profile, Role};
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

/// A resolved session: authenticated identity plus its profile
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session: Session,
    pub profile: Profile,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        policy::is_admin(&self.profile)
    }
}

pub struct SessionManager {
    backend: Arc<dyn Backend>,
    admin_email: String,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn Backend>, admin_email: impl Into<String>) -> Self {
        Self {
            backend,
            admin_email: admin_email.into(),
        }
    }

    /// Sign in and resolve the profile
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<CurrentUser> {
        let session = self
            .backend
            .sign_in(email, password)
            .await
            .map_err(|_| AppError::invalid_credentials())?;
        self.resolve(session).await
    }

    /// Register a seller account; the profile row is created on first
    /// resolved sign-in from this metadata
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        city: &str,
        telefone: &str,
    ) -> AppResult<()> {
        let metadata = json!({
            "full_name": full_name,
            "city": city,
            "telefone": telefone,
        });
        self.backend
            .sign_up(email, password, metadata)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        self.backend.sign_out().await.map_err(AppError::from)
    }

    /// Subscribe to auth-state changes; feed each event back through
    /// [`Self::on_auth_event`]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AuthEvent> {
        self.backend.subscribe()
    }

    /// Re-resolve the profile after an auth-state change
    pub async fn on_auth_event(&self, event: AuthEvent) -> AppResult<Option<CurrentUser>> {
        match event {
            AuthEvent::SignedIn(session) => Ok(Some(self.resolve(session).await?)),
            AuthEvent::SignedOut => Ok(None),
        }
    }

    /// Resolve the current session, if one exists
    pub async fn current(&self) -> AppResult<Option<CurrentUser>> {
        match self.backend.session().await.map_err(AppError::from)? {
            Some(session) => Ok(Some(self.resolve(session).await?)),
            None => Ok(None),
        }
    }

    async fn resolve(&self, session: Session) -> AppResult<CurrentUser> {
        match self.resolve_profile(&session).await {
            Ok(profile) => Ok(CurrentUser { session, profile }),
            Err(err) => {
                // A session without a profile cannot use the app
                tracing::warn!(user = %session.user.id, error = %err, "profile resolution failed, signing out");
                let _ = self.backend.sign_out().await;
                Err(err)
            }
        }
    }

    async fn resolve_profile(&self, session: &Session) -> AppResult<Profile> {
        // The configured admin account never depends on a profile row
        if session.user.email.as_deref() == Some(self.admin_email.as_str()) {
            return Ok(Profile {
                id: session.user.id.clone(),
                full_name: metadata_str(session, "full_name")
                    .unwrap_or_else(|| "Administrador".into()),
                role: Role::Admin,
                city: None,
                telefone: None,
                cpf: None,
            });
        }

        let rows = self
            .backend
            .select(
                "profiles",
                mix_client::Query::new().eq("id", &session.user.id),
            )
            .await
            .map_err(AppError::from)?;

        if let Some(row) = rows.into_iter().next() {
            return serde_json::from_value(row).map_err(|e| {
                AppError::with_message(ErrorCode::ProfileIncomplete, e.to_string())
            });
        }

        // No row yet: synthesize one from signup metadata
        let full_name = metadata_str(session, "full_name").ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ProfileIncomplete,
                "signup metadata missing full_name",
            )
        })?;
        let profile = NewProfile {
            id: session.user.id.clone(),
            full_name,
            role: Role::Vendedor,
            city: metadata_str(session, "city"),
            telefone: metadata_str(session, "telefone"),
        };

        let inserted = self
            .backend
            .insert("profiles", serde_json::to_value(&profile)?)
            .await
            .map_err(AppError::from)?;
        let row = inserted.into_iter().next().ok_or_else(|| {
            AppError::with_message(ErrorCode::ProfileIncomplete, "profile insert returned no row")
        })?;
        serde_json::from_value(row)
            .map_err(|e| AppError::with_message(ErrorCode::ProfileIncomplete, e.to_string()))
    }
}

fn metadata_str(session: &Session, key: &str) -> Option<String> {
    session
        .user
        .user_metadata
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}
