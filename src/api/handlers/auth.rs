//! Sign-up, sign-in and sign-out.

use std::time::Duration;

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use crate::api::AppState;
use crate::auth::{hash_password, verify_password, SESSION_COOKIE};
use crate::error::{BlogError, Result};
use crate::models::{Credentials, MessageResponse, SignInResponse, User};

/// Handler for POST /signup
///
/// Creates the account and signs the new user in. If the session cannot
/// be started the account is still created and no cookie is set.
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(creds): Json<Credentials>,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if let Some(error_msg) = creds.validate() {
        return Err(BlogError::BadRequest(error_msg));
    }

    // Cheap early exit; the store enforces uniqueness on insert
    if state.store.find_user(&creds.username).await?.is_some() {
        return Err(BlogError::Conflict("username already exists".to_string()));
    }

    let password = creds.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BlogError::Internal(e.to_string()))??;

    state
        .store
        .insert_user(User::new(creds.username.clone(), password_hash))
        .await?;

    info!(username = %creds.username, "user signed up");

    // The account exists from here on; a failed session only skips the auto sign-in
    match state.sessions.create(&creds.username).await {
        Ok(session) => Ok((
            jar.add(session_cookie(session.token, state.sessions.ttl())),
            Json(MessageResponse::new("sign up successful")),
        )),
        Err(e) => {
            warn!(
                username = %creds.username,
                error = %e,
                "account created but session could not be started"
            );
            Ok((
                jar,
                Json(MessageResponse::new("sign up successful, please sign in")),
            ))
        }
    }
}

/// Handler for POST /signin
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(creds): Json<Credentials>,
) -> Result<(CookieJar, Json<SignInResponse>)> {
    let Some(user) = state.store.find_user(&creds.username).await? else {
        warn!(username = %creds.username, "sign-in for unknown user");
        return Err(BlogError::Unauthorized);
    };

    let password = creds.password;
    let stored = user.password_hash;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| BlogError::Internal(e.to_string()))??;

    if !matches {
        warn!(username = %user.username, "sign-in with wrong password");
        return Err(BlogError::Unauthorized);
    }

    let session = state.sessions.create(&user.username).await?;
    info!(username = %user.username, "user signed in");

    let token = session.token.clone();
    Ok((
        jar.add(session_cookie(session.token, state.sessions.ttl())),
        Json(SignInResponse::new(token)),
    ))
}

/// Handler for POST /signout
///
/// Always succeeds, signed in or not.
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(MessageResponse::new("signed out")),
    )
}

fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
    let max_age = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn creds(username: &str, password: &str) -> Json<Credentials> {
        Json(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let state = AppState::in_memory(Config::default());

        let (jar, Json(msg)) = sign_up(
            State(state.clone()),
            CookieJar::new(),
            creds("alice", "hunter2"),
        )
        .await
        .unwrap();
        assert_eq!(msg.message, "sign up successful");
        let token = jar.get(SESSION_COOKIE).unwrap().value().to_string();
        assert!(state.sessions.lookup(&token).await.is_some());

        let (jar, Json(resp)) = sign_in(
            State(state.clone()),
            CookieJar::new(),
            creds("alice", "hunter2"),
        )
        .await
        .unwrap();
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().value(), resp.cookie);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let state = AppState::in_memory(Config::default());

        sign_up(State(state.clone()), CookieJar::new(), creds("bob", "pw"))
            .await
            .unwrap();
        let again = sign_up(State(state), CookieJar::new(), creds("bob", "other")).await;

        assert!(matches!(again, Err(BlogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_up_without_session_keeps_account() {
        let state = AppState::in_memory(Config::default());
        // A session this large is refused by the cache
        let username = "x".repeat(crate::cache::MAX_VALUE_SIZE);

        let (jar, Json(msg)) = sign_up(
            State(state.clone()),
            CookieJar::new(),
            creds(&username, "pw"),
        )
        .await
        .unwrap();

        assert_eq!(msg.message, "sign up successful, please sign in");
        assert!(jar.get(SESSION_COOKIE).is_none());
        assert!(state.store.find_user(&username).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_credentials() {
        let state = AppState::in_memory(Config::default());
        sign_up(State(state.clone()), CookieJar::new(), creds("carol", "right"))
            .await
            .unwrap();

        let wrong = sign_in(State(state.clone()), CookieJar::new(), creds("carol", "wrong")).await;
        assert!(matches!(wrong, Err(BlogError::Unauthorized)));

        let unknown = sign_in(State(state), CookieJar::new(), creds("nobody", "x")).await;
        assert!(matches!(unknown, Err(BlogError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_sign_out_destroys_session() {
        let state = AppState::in_memory(Config::default());
        let session = state.sessions.create("dave").await.unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, session.token.clone()));

        let (jar, Json(msg)) = sign_out(State(state.clone()), jar).await;

        assert_eq!(msg.message, "signed out");
        assert!(jar.get(SESSION_COOKIE).is_none());
        assert!(state.sessions.lookup(&session.token).await.is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), Duration::from_secs(3600));
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
    }
}
