use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::handlers::{Repository, Users},
    errors::{Error, Result},
    types::Operation,
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::{debug, instrument, trace};

/// Signed-in user that must be an administrator. Rejects with 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

/// Find and verify the session cookie.
///
/// Returns:
/// - None: No session cookie present, or none that verifies
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but not readable
fn session_user(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == cookie_name
        {
            match session::verify_session_token(value, config) {
                Ok(user) => return Some(Ok(user)),
                // Expired tokens are routine; keep looking in case of duplicates
                Err(e) => trace!("Ignoring session cookie: {e}"),
            }
        }
    }
    None
}

/// Re-read the account so deleted users lose access and promotions apply immediately.
async fn refresh(user: CurrentUser, state: &AppState) -> Result<Option<CurrentUser>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let fresh = Users::new(&mut conn).get_by_id(user.id).await?;
    Ok(fresh.map(CurrentUser::from))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match session_user(parts, &state.config) {
            Some(Ok(user)) => match refresh(user, state).await? {
                Some(user) => {
                    debug!("Found session user: {}", user.id);
                    Ok(user)
                }
                None => Err(Error::Unauthenticated { message: None }),
            },
            Some(Err(e)) => Err(e),
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        match session_user(parts, &state.config) {
            Some(Ok(user)) => refresh(user, state).await,
            Some(Err(_)) | None => Ok(None),
        }
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = <CurrentUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        require_admin(user).map(AdminUser)
    }
}

/// Turn a non-admin into a 403
pub fn require_admin(user: CurrentUser) -> Result<CurrentUser> {
    if user.is_admin {
        Ok(user)
    } else {
        Err(Error::InsufficientPermissions {
            action: Operation::Read,
            resource: "admin pages".to_string(),
        })
    }
}
