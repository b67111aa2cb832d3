use axum::{
    extract::{FromRef, State},
    routing::post,
    Form, Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::TokenKind,
        dto::{LoginForm, RefreshRequest, Token},
        jwt::{JwtKeys, TokenError},
        password::verify_password,
        repo_types::User,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(login))
        .route("/token/refresh", post(refresh))
}

/// Issues an access/refresh pair stamped with the same instant.
pub(crate) fn issue_pair(keys: &JwtKeys, user_id: i64, now: OffsetDateTime) -> Result<Token, TokenError> {
    let access = keys.issue_at(user_id, TokenKind::Access, now)?;
    let refresh = keys.issue_at(user_id, TokenKind::Refresh, now)?;
    Ok(Token {
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "Bearer".into(),
        scope: String::new(),
        expires_in: keys.access_ttl.as_secs(),
        expires_at: access.expires_at,
        issued_at: access.issued_at,
    })
}

#[instrument(skip(state, form))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Json<Token>> {
    let Some(user) = User::find_by_login(&state.db, form.username.trim()).await? else {
        warn!(login = %form.username, "login unknown user");
        return Err(AppError::Unauthenticated);
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthenticated);
    }

    let user = User::touch_last_login(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let now = user.last_login_date.unwrap_or_else(OffsetDateTime::now_utc);
    let token = issue_pair(&keys, user.id, now).map_err(anyhow::Error::from)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(token))
}

#[instrument(skip(state, payload))]
pub async fn refresh(State(state): State<AppState>, Json(payload): Json<RefreshRequest>) -> AppResult<Json<Token>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthenticated
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let token = issue_pair(&keys, user.id, OffsetDateTime::now_utc()).map_err(anyhow::Error::from)?;
    info!(user_id = user.id, "token refreshed");
    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_pair_is_well_formed() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = issue_pair(&keys, 11, OffsetDateTime::now_utc()).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 5 * 60);
        assert_eq!(keys.validate(&token.access_token).unwrap(), 11);
        assert_eq!(keys.verify_refresh(&token.refresh_token).unwrap().sub, 11);
        assert!(keys.validate(&token.refresh_token).is_err());

        let json = serde_json::to_value(&token).unwrap();
        assert!(json["expires_at"].is_string());
        assert!(json["issued_at"].is_string());
    }
}
