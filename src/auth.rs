use actix_web::HttpRequest;

use crate::document_store::DocumentStoreClient;

const ADMIN_ROLE: &str = "admin";

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Authentication required. You must be logged in to call this function.")]
    Unauthenticated,
    #[error("Admin access required. You do not have permission to perform this action.")]
    PermissionDenied,
    #[error("Error verifying admin status.")]
    Unexpected(#[source] reqwest::Error),
}

/// Extracts the caller uid from the Authorization header. Token verification
/// belongs to the identity provider fronting this service; by the time a
/// request reaches us the bearer value is the verified uid.
pub fn caller_uid(request: &HttpRequest) -> Result<String, AuthError> {
    let uid = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
        .ok_or(AuthError::Unauthenticated)?;

    Ok(String::from(uid))
}

/// Checks `users/{uid}.role` against the document store. Evaluated fresh on
/// every call; roles are never cached in-process.
#[tracing::instrument(name = "Verifying admin role", skip(document_store))]
pub async fn verify_admin(
    uid: &str,
    document_store: &DocumentStoreClient,
) -> Result<(), AuthError> {
    let role = document_store
        .fetch_user_role(uid)
        .await
        .map_err(AuthError::Unexpected)?;

    match role.as_deref() {
        Some(ADMIN_ROLE) => Ok(()),
        _ => {
            tracing::info!("Admin verification failed for uid {}.", uid);

            Err(AuthError::PermissionDenied)
        }
    }
}
