//! Admin guard for tournament administration endpoints.
//!
//! Admin routes expect the configured key in the `x-admin-key` header:
//!
//! ```text
//! x-admin-key: 3f9c2a...
//! ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use league::db::LeagueRepository;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::AppState;
use crate::logging::log_security_event;

/// Header carrying the admin key
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// SHA-256 digest of the configured admin key
///
/// Only the digest is kept in memory. Comparing fixed-length digests in
/// constant time does not leak the key length or a matching prefix.
#[derive(Clone)]
pub struct AdminKey {
    digest: [u8; 32],
}

impl AdminKey {
    pub fn new(key: &str) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(key.as_bytes()));
        Self { digest }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        let candidate = Sha256::digest(candidate.as_bytes());
        self.digest.as_slice().ct_eq(candidate.as_slice()).into()
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdminKey({}..)", &hex::encode(self.digest)[..8])
    }
}

/// Reject requests without a valid `x-admin-key` header
///
/// - **Valid key**: calls the next handler
/// - **Missing or wrong key**: `401 Unauthorized`
pub async fn admin_guard<R: LeagueRepository + 'static>(
    State(state): State<AppState<R>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if state.admin_key.verify(key) => Ok(next.run(request).await),
        Some(_) => {
            log_security_event(
                "admin_key_rejected",
                Some(request.uri().path()),
                "Invalid admin key",
            );
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            log_security_event(
                "admin_key_missing",
                Some(request.uri().path()),
                "Admin endpoint called without key",
            );
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
