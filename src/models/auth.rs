use serde::{Deserialize, Serialize};

/// Claims embedded in the access token issued by the identity provider.
///
/// The service verifies tokens, it never issues them. `sub` is the caller's
/// opaque principal; roles are looked up server-side so a role change takes
/// effect without reissuing the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Extracted from the validated bearer token — available via axum extractors.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub principal: String,
}
