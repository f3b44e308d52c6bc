//! Token claims and account roles.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular user.
    #[default]
    User,
    /// Administrator.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account username).
    pub sub: String,

    /// Account role at issue time.
    #[serde(default)]
    pub role: Role,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Whether the token is expired at `now`.
    ///
    /// The boundary is inclusive: a token whose expiry equals `now` is
    /// already expired.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Check if the subject holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "USER");
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("invalid".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"USER\"").unwrap(),
            Role::User
        );
    }

    #[test]
    fn test_expiry_boundary_inclusive() {
        let claims = Claims {
            sub: "alice".to_string(),
            role: Role::User,
            iat: 1000,
            exp: 2000,
        };
        assert!(!claims.is_expired(1999));
        assert!(claims.is_expired(2000));
        assert!(claims.is_expired(2001));
    }
}
