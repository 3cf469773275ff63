use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::errors::AppError;

/// Request-scoped identity. The bearer token carries the user id already
/// verified by the upstream gateway; this service trusts it and never
/// consults any ambient session state. Token issuance lives elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

fn user_from_header(value: Option<&str>) -> Result<AuthenticatedUser, AppError> {
    let token = value
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;
    Uuid::parse_str(token.trim())
        .map(AuthenticatedUser)
        .map_err(|_| AppError::Unauthorized)
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        ready(user_from_header(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bearer_uuid() {
        let id = Uuid::new_v4();
        let user = user_from_header(Some(&format!("Bearer {id}"))).expect("should authenticate");
        assert_eq!(user.0, id);
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            user_from_header(None),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_wrong_scheme() {
        assert!(matches!(
            user_from_header(Some("Basic abc123")),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(matches!(
            user_from_header(Some("Bearer not-a-uuid")),
            Err(AppError::Unauthorized)
        ));
    }
}
