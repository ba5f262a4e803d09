//! Authentication
//!
//! Bearer tokens carry the caller's identity: subject, role and the hospitals
//! the caller works at or covers. A validated token becomes the [`Actor`]
//! passed to every workflow operation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Actor, ActorId, HospitalId, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: String,
    /// Workflow role, snake_case
    pub role: String,
    /// Hospitals in the caller's scope
    #[serde(default)]
    pub hospital_ids: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Malformed identifier in token: {0}")]
    MalformedId(String),
}

impl Claims {
    /// Converts the claims into the caller identity
    pub fn actor(&self) -> Result<Actor, AuthError> {
        let id: ActorId = self
            .sub
            .parse()
            .map_err(|_| AuthError::MalformedId(self.sub.clone()))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|_| AuthError::UnknownRole(self.role.clone()))?;
        let hospital_ids = self
            .hospital_ids
            .iter()
            .map(|raw| {
                raw.parse::<HospitalId>()
                    .map_err(|_| AuthError::MalformedId(raw.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Actor {
            id,
            role,
            hospital_ids,
        })
    }
}

/// Creates a signed token for an actor
///
/// # Arguments
///
/// * `actor` - Identity to encode
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    actor: &Actor,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: actor.id.to_string(),
        role: actor.role.to_string(),
        hospital_ids: actor.hospital_ids.iter().map(|h| h.to_string()).collect(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_carries_actor() {
        let actor = Actor::new(ActorId::new(), Role::MedicalReferent)
            .at_hospital(HospitalId::new())
            .at_hospital(HospitalId::new());

        let token = create_token(&actor, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.role, "medical_referent");
        assert_eq!(claims.actor().unwrap(), actor);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let actor = Actor::new(ActorId::new(), Role::Insured);
        let token = create_token(&actor, SECRET, 60).unwrap();
        assert!(matches!(
            validate_token(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: ActorId::new().to_string(),
            role: "insured".to_string(),
            hospital_ids: vec![],
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let claims = Claims {
            sub: ActorId::new().to_string(),
            role: "admin".to_string(),
            hospital_ids: vec![],
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.actor(), Err(AuthError::UnknownRole(_))));
    }

    #[test]
    fn test_bare_uuid_subject_is_accepted() {
        let id = ActorId::new();
        let claims = Claims {
            sub: id.as_uuid().to_string(),
            role: "claims_agent".to_string(),
            hospital_ids: vec![],
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.actor().unwrap().id, id);
    }
}
