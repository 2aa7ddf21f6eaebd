use crate::identity::AuthState;
use axum::{extract::Extension, response::IntoResponse};

// axum handler for the landing page
pub async fn root() -> impl IntoResponse {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

// axum handler for the home page, reads the user through the typed accessor
pub async fn home(auth: Option<Extension<AuthState>>) -> impl IntoResponse {
    match auth.as_ref().and_then(|Extension(auth)| auth.user_id()) {
        Some(user_id) => format!("Welcome back, {user_id}"),
        None => "Welcome".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::UserId;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn body_of(app: Router, uri: &str) -> String {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn root_names_the_service() {
        let app = Router::new().route("/", get(root));
        let body = body_of(app, "/").await;
        assert!(body.starts_with(env!("CARGO_PKG_NAME")));
    }

    #[tokio::test]
    async fn home_greets_signed_in_user() {
        let user = UserId::parse("user_7").unwrap();
        let app = Router::new()
            .route("/home", get(home))
            .layer(Extension(AuthState::signed_in(user)));
        assert_eq!(body_of(app, "/home").await, "Welcome back, user_7");
    }

    #[tokio::test]
    async fn home_without_auth_state() {
        let app = Router::new().route("/home", get(home));
        assert_eq!(body_of(app, "/home").await, "Welcome");
    }
}
