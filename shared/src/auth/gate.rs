//! Per-request checks against the signed cookies. None of these touch
//! storage: authorization is a pure function of the verified claims.

use super::claims::{AuthClaims, InviteClaims, StateClaims};
use super::cookies;
use super::token::TokenCodec;
use crate::error::ApiError;
use crate::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Admin,
}

/// Verify the auth cookie and, for admin-only operations, the role.
pub fn authorize(
    codec: &TokenCodec<AuthClaims>,
    cookie_header: Option<&str>,
    role: Role,
) -> Result<AuthClaims, ApiError> {
    let token = cookies::read(cookie_header, cookies::AUTH_TOKEN)
        .ok_or_else(|| ApiError::unauthorized(messages::AUTH_NOT_FOUND))?;

    let claims = codec.decode(token).map_err(|e| {
        tracing::info!("rejected auth token: {}", e);
        ApiError::unauthorized(messages::AUTH_INVALID)
    })?;

    if role == Role::Admin && !claims.is_admin {
        tracing::warn!("non-admin {} attempted an admin operation", claims.username);
        return Err(ApiError::forbidden(messages::NOT_ADMIN));
    }

    Ok(claims)
}

/// Verify and decode the caller's board-layout snapshot.
pub fn read_state(
    codec: &TokenCodec<StateClaims>,
    cookie_header: Option<&str>,
) -> Result<StateClaims, ApiError> {
    let token = cookies::read(cookie_header, cookies::STATE_TOKEN)
        .ok_or_else(|| ApiError::bad_request(messages::STATE_NOT_FOUND))?;

    codec.decode(token).map_err(|e| {
        tracing::info!("rejected state token: {}", e);
        ApiError::bad_request(messages::STATE_INVALID)
    })
}

/// The invite carried by the request, if any. A present but unverifiable
/// invite is an error rather than a silent fall-back to a new team.
pub fn read_invite(
    codec: &TokenCodec<InviteClaims>,
    cookie_header: Option<&str>,
) -> Result<Option<InviteClaims>, ApiError> {
    let Some(token) = cookies::read(cookie_header, cookies::INVITE_TOKEN) else {
        return Ok(None);
    };

    codec.decode(token).map(Some).map_err(|e| {
        tracing::info!("rejected invite token: {}", e);
        ApiError::bad_request(messages::INVITE_INVALID)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lambda_http::http::StatusCode;

    const KEY: &[u8] = b"gate-test-key";

    fn auth_cookie(is_admin: bool) -> String {
        let codec = TokenCodec::<AuthClaims>::new(KEY, cookies::AUTH_TOKEN);
        let token = codec
            .encode(
                &AuthClaims {
                    username: "bob123".to_string(),
                    is_admin,
                    team_id: "team-1".to_string(),
                },
                Duration::hours(1),
            )
            .unwrap();
        format!("{}={}", cookies::AUTH_TOKEN, token)
    }

    #[test]
    fn missing_and_invalid_auth_are_distinguished() {
        let codec = TokenCodec::<AuthClaims>::new(KEY, cookies::AUTH_TOKEN);

        let err = authorize(&codec, None, Role::Member).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, messages::AUTH_NOT_FOUND);

        let err = authorize(&codec, Some("auth-token=garbage"), Role::Member).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, messages::AUTH_INVALID);
    }

    #[test]
    fn admin_operations_require_admin_claims() {
        let codec = TokenCodec::<AuthClaims>::new(KEY, cookies::AUTH_TOKEN);
        let member = auth_cookie(false);

        assert!(authorize(&codec, Some(&member), Role::Member).is_ok());
        let err = authorize(&codec, Some(&member), Role::Admin).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let admin = auth_cookie(true);
        assert!(authorize(&codec, Some(&admin), Role::Admin).unwrap().is_admin);
    }

    #[test]
    fn state_problems_are_bad_requests() {
        let codec = TokenCodec::<StateClaims>::new(KEY, cookies::STATE_TOKEN);

        let err = read_state(&codec, None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, messages::STATE_NOT_FOUND);

        let err = read_state(&codec, Some(&auth_cookie(true).replacen("auth", "state", 1)))
            .unwrap_err();
        assert_eq!(err.message, messages::STATE_INVALID);
    }

    #[test]
    fn absent_invite_is_not_an_error() {
        let codec = TokenCodec::<InviteClaims>::new(KEY, cookies::INVITE_TOKEN);
        assert_eq!(read_invite(&codec, Some("theme=dark")).unwrap(), None);

        let err = read_invite(&codec, Some("invite-token=nope")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
