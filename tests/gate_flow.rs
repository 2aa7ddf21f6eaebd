//! End-to-end gate behavior through the public API.
//!
//! Builds the full router with a stand-in identity provider and walks a user
//! through the sign-up flow: anonymous visit, redirect to sign-in, sign-up
//! page, then the signed-in view of the same routes.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::LOCATION, Request, StatusCode},
    Router,
};
use gatehouse::{
    api::{router, GateState, WidgetConfig},
    gate::{Decision, GatePolicy, GateRequest, GateScope},
    identity::{StaticIdentity, UserId},
};
use std::sync::Arc;
use tower::ServiceExt;

const SESSION: &str = "sess_abc";

fn app() -> Result<Router> {
    let identity = StaticIdentity::new().with_user(SESSION, UserId::parse("user_2fa")?);
    let gate = GateState::new(
        GatePolicy::standard()?,
        GateScope::standard()?,
        Arc::new(identity),
        "__session".to_string(),
    );
    let widget = WidgetConfig::new(
        "https://accounts.example.com/widget.js".to_string(),
        "/home".to_string(),
    );
    router(Arc::new(gate), Arc::new(widget))
}

async fn get(uri: &str, session: Option<&str>) -> Result<(StatusCode, Option<String>, String)> {
    let mut builder = Request::builder()
        .uri(uri)
        .header("host", "app.example.com")
        .header("x-forwarded-proto", "https");
    if let Some(token) = session {
        builder = builder.header("cookie", format!("theme=dark; __session={token}"));
    }

    let response = app()?.oneshot(builder.body(Body::empty())?).await?;
    let status = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await?;

    Ok((status, location, String::from_utf8(body.to_vec())?))
}

#[tokio::test]
async fn anonymous_user_is_sent_to_sign_in() -> Result<()> {
    let (status, location, _) = get("/settings/profile", None).await?;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("https://app.example.com/sign-in"));
    Ok(())
}

#[tokio::test]
async fn anonymous_user_can_open_sign_up() -> Result<()> {
    let (status, location, body) = get("/sign-up", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(location.is_none());
    assert!(body.contains("https://accounts.example.com/widget.js"));
    Ok(())
}

#[tokio::test]
async fn signed_in_user_skips_sign_up() -> Result<()> {
    let (status, location, _) = get("/sign-up", Some(SESSION)).await?;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("https://app.example.com/home"));
    Ok(())
}

#[tokio::test]
async fn signed_in_user_lands_on_home() -> Result<()> {
    let (status, _, body) = get("/home", Some(SESSION)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Welcome back, user_2fa");
    Ok(())
}

#[tokio::test]
async fn public_api_is_open_and_private_api_is_not() -> Result<()> {
    let (status, _, _) = get("/api/video", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, location, _) = get("/api/secret", None).await?;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("https://app.example.com/sign-in"));
    Ok(())
}

#[test]
fn documented_examples() -> Result<()> {
    let policy = GatePolicy::standard()?;
    let cases = [
        (true, "/", Decision::RedirectHome),
        (false, "/api/video", Decision::Allow),
        (false, "/api/secret", Decision::RedirectSignIn),
        (true, "/home", Decision::Allow),
        (false, "/sign-in", Decision::Allow),
    ];
    for (authenticated, path, expected) in cases {
        let request = GateRequest::new(path, authenticated);
        assert_eq!(policy.evaluate(&request), expected, "{path} ({authenticated})");
    }
    Ok(())
}

#[test]
fn request_without_url_is_treated_as_root() -> Result<()> {
    let policy = GatePolicy::standard()?;
    assert_eq!(
        policy.evaluate(&GateRequest::from_url(None, false)),
        Decision::Allow
    );
    assert_eq!(
        policy.evaluate(&GateRequest::from_url(None, true)),
        Decision::RedirectHome
    );
    Ok(())
}
