//! First-run administrator credential bootstrap.

use crate::error::{ApiError, ApiResult};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use time::OffsetDateTime;
use wisp_core::config::GateConfig;
use wisp_metadata::models::UserRow;
use wisp_metadata::{MetadataError, RecordStore};

/// Literal lookup key of the bootstrap administrator credential.
pub const ADMIN_USER_KEY: &str = "admin";

/// Outcome of the read-or-create bootstrap check.
pub enum BootstrapOutcome {
    /// Credential already exists; the anonymous admin path is closed.
    Present,
    /// First run: credential created. The plaintext secret must be delivered
    /// to the operator out-of-band; it is never persisted.
    Created { secret: String },
}

/// Idempotent read-or-create of the administrator credential.
///
/// The credential is stored twice: under [`ADMIN_USER_KEY`] and under the
/// sha256 of the generated secret, so later requests presenting the
/// plaintext secret resolve via the derived key (see
/// [`crate::auth::derived_key`]). Losing the create race to a concurrent
/// first request degrades to `Present`.
pub async fn read_or_create_admin(
    metadata: &dyn RecordStore,
    gate: &GateConfig,
) -> ApiResult<BootstrapOutcome> {
    if metadata.get_user(ADMIN_USER_KEY).await?.is_some() {
        return Ok(BootstrapOutcome::Present);
    }

    let secret = wisp_core::generate(gate.bootstrap_secret_length);
    let now = OffsetDateTime::now_utc();
    let admin = UserRow {
        user_key: ADMIN_USER_KEY.to_string(),
        email: gate.admin_email.clone(),
        password_hash: hash_secret(&secret)?,
        created_at: now,
    };

    match metadata.create_user(&admin).await {
        Ok(()) => {}
        // Another request bootstrapped between our read and create.
        Err(MetadataError::AlreadyExists(_)) => return Ok(BootstrapOutcome::Present),
        Err(e) => return Err(e.into()),
    }

    let derived = UserRow {
        user_key: crate::auth::derived_key(&secret),
        ..admin
    };
    metadata.create_user(&derived).await?;

    tracing::info!(email = %gate.admin_email, "Bootstrap administrator credential created");

    Ok(BootstrapOutcome::Created { secret })
}

/// Hash the bootstrap secret for at-rest storage using argon2id.
fn hash_secret(secret: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash bootstrap secret: {e}")))
}
