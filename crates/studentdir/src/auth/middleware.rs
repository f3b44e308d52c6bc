//! Session authentication middleware and extractors.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info};

use super::claims::{Claims, Role};
use super::config::{AuthConfig, ConfigValidationError};
use super::error::AuthError;
use super::revocation::RevocationRegistry;
use super::token::TokenCodec;

/// Extract a bearer token from an Authorization header value.
///
/// The scheme prefix is the literal `"Bearer "` with a single space,
/// matched case-sensitively. Anything else means no credentials were
/// presented.
fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Authentication state shared across handlers.
///
/// Owns the token codec and the revocation registry; both live for the
/// lifetime of the process.
#[derive(Clone)]
pub struct AuthState {
    codec: TokenCodec,
    revoked: Arc<RevocationRegistry>,
    config: Arc<AuthConfig>,
}

impl AuthState {
    /// Create auth state from config.
    ///
    /// Resolves `env:VAR_NAME` secret indirection. When no secret is
    /// configured, one is generated; tokens minted by this process are
    /// then worthless to any other process, which is the desired
    /// behavior for an unconfigured instance.
    pub fn new(config: AuthConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;

        let secret = match config.resolve_jwt_secret()? {
            Some(secret) => secret,
            None => {
                info!("no JWT secret configured, generating a process-local one");
                AuthConfig::generate_secret()
            }
        };

        Ok(Self {
            codec: TokenCodec::new(&secret),
            revoked: Arc::new(RevocationRegistry::new()),
            config: Arc::new(config),
        })
    }

    /// Issue a session token for an authenticated account.
    pub fn issue_token(&self, username: &str, role: Role) -> Result<String, AuthError> {
        self.codec
            .issue(username, role, self.config.token_ttl_secs)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Decide whether a request is authenticated.
    ///
    /// Returns the principal on success. Every failure mode — missing
    /// header, wrong scheme, revoked, malformed, bad signature,
    /// expired — collapses to `None`: absence of credentials is a valid
    /// state, not an error.
    pub fn authenticate(&self, header_value: Option<&str>) -> Option<CurrentUser> {
        let token = header_value.and_then(bearer_token)?;

        // Revocation wins over everything else.
        if self.revoked.is_revoked(token) {
            debug!("rejected revoked token");
            return None;
        }

        match self.codec.decode(token) {
            Ok(claims) => Some(CurrentUser { claims }),
            Err(e) => {
                debug!("token validation failed: {e}");
                None
            }
        }
    }

    /// Revoke the token carried by an Authorization header, if any.
    ///
    /// Unconditionally idempotent: a missing or malformed header, or a
    /// token that is already expired or undecodable, is treated as
    /// already-logged-out. Returns whether a live token was revoked.
    pub fn revoke_from_header(&self, header_value: Option<&str>) -> bool {
        let Some(token) = header_value.and_then(bearer_token) else {
            return false;
        };

        match self.codec.decode(token) {
            Ok(claims) => {
                self.revoked.revoke(token, claims.exp);
                true
            }
            // Expired or garbage tokens can never authenticate again;
            // tracking them would only grow the registry.
            Err(_) => false,
        }
    }

    /// Handle to the revocation registry (for the sweep task).
    pub fn revocations(&self) -> Arc<RevocationRegistry> {
        self.revoked.clone()
    }

    /// Allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    /// Seconds between revocation sweeps.
    pub fn sweep_interval_secs(&self) -> u64 {
        self.config.sweep_interval_secs
    }
}

/// Authenticated principal extracted from a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Token claims.
    pub claims: Claims,
}

impl CurrentUser {
    /// Get the account username.
    pub fn username(&self) -> &str {
        &self.claims.sub
    }

    /// Get the account role.
    pub fn role(&self) -> Role {
        self.claims.role
    }

    /// Check if the principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

/// Extract an authenticated principal, rejecting with 401 when absent.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Optional principal for routes that are open to everyone.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Require the admin role.
///
/// Use as an extractor in handlers that require admin access.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions(
                "admin role required".to_string(),
            ));
        }

        Ok(RequireAdmin(user))
    }
}

/// Authentication middleware.
///
/// Validates the bearer token and, on success, injects `CurrentUser`
/// into request extensions. The check is advisory: the request always
/// proceeds, and per-route extractors decide whether an unauthenticated
/// caller is acceptable.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(user) = auth.authenticate(header_value) {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
