//! The authentication gate: password hashing, session establishment, and
//! the privilege guard handlers call before gated actions.
//!
//! Session state is never ambient. Handlers resolve a [`SessionIdentity`]
//! from the request's session up front and pass it along explicitly.

use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::thread_rng;
use serde::Serialize;
use tower_sessions::Session;
use tracing::debug;

use crate::error::AppError;
use crate::models::forms::{validate_signup, LoginForm, SignupForm};
use crate::models::user::{NewUser, User};
use crate::services::users::UserService;

/// Session key holding the authenticated user's id.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// The authenticated user a request acts as. Resolved from the session's
/// claimed id against the `users` table on every request; carries no
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub user_id: i32,
    pub username: String,
}

impl From<&User> for SessionIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Argon2id hasher with costs taken from configuration.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
}

impl Hasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow!("bad argon2 params: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
    pub fn verify(&self, password: &str, stored: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("unreadable hash: {e}"))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Creates the account and logs it in.
///
/// The uniqueness checks are read-before-insert; two racing signups can both
/// pass them. The UNIQUE constraints in the schema are the backstop, and the
/// loser surfaces a storage error.
pub async fn register<U: UserService>(
    users: &U,
    hasher: &Hasher,
    session: &Session,
    form: &SignupForm,
) -> Result<SessionIdentity, AppError> {
    let errors = validate_signup(form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if users
        .get_user_by_username(&form.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("username"));
    }
    if users.get_user_by_email(&form.email).await?.is_some() {
        return Err(AppError::Conflict("email"));
    }

    let password_hash = hasher.hash(&form.password)?;
    let user = users
        .create_user(&NewUser {
            username: form.username.clone(),
            email: form.email.clone(),
            password_hash,
        })
        .await?;

    debug!(user_id = user.id, "registered new user");
    establish(session, &user).await
}

pub async fn login<U: UserService>(
    users: &U,
    hasher: &Hasher,
    session: &Session,
    form: &LoginForm,
) -> Result<SessionIdentity, AppError> {
    let Some(user) = users.get_user_by_username(&form.username).await? else {
        return Err(AppError::NotFound("user"));
    };

    if !hasher.verify(&form.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    establish(session, &user).await
}

/// Drops the session. Flushing an already-empty session is a no-op, so
/// calling this twice in a row is harmless.
pub async fn logout(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}

/// Resolves the session's claimed user id to a live row. A stale claim
/// (user deleted since login) reads as logged out.
pub async fn current_identity<U: UserService>(
    users: &U,
    session: &Session,
) -> Result<Option<SessionIdentity>, AppError> {
    let Some(claimed) = session.get::<i32>(SESSION_USER_ID_KEY).await? else {
        return Ok(None);
    };
    Ok(users
        .get_user(claimed)
        .await?
        .map(|user| SessionIdentity::from(&user)))
}

/// The gate in front of privileged actions. Only demands that *some* user is
/// logged in; any authenticated user may create or delete any post.
pub fn require_privileged(identity: Option<&SessionIdentity>) -> Result<&SessionIdentity, AppError> {
    identity.ok_or(AppError::Forbidden)
}

async fn establish(session: &Session, user: &User) -> Result<SessionIdentity, AppError> {
    session.insert(SESSION_USER_ID_KEY, user.id).await?;
    Ok(SessionIdentity::from(user))
}
