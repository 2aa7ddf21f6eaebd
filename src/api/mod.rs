use crate::{
    api::handlers::{health, not_found, pages, root},
    cli::telemetry,
};
use anyhow::{bail, Result};
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::{collections::HashSet, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
pub mod middleware;
mod openapi;

pub use handlers::pages::WidgetConfig;
pub use middleware::GateState;
pub use openapi::openapi;

const ROOT_PATH: &str = "/";
const SIGN_UP_PATH: &str = "/sign-up";
const HEALTH_PATH: &str = "/health";

/// Build the application router with the gate applied to every route and the fallback.
///
/// # Errors
/// Returns an error if the configured home or sign-in path collides with another route.
pub fn router(gate: Arc<GateState>, widget: Arc<WidgetConfig>) -> Result<Router> {
    let home_path = gate.policy().home_path().to_string();
    let sign_in_path = gate.policy().sign_in_path().to_string();

    let mut seen = HashSet::new();
    for path in [
        ROOT_PATH,
        SIGN_UP_PATH,
        HEALTH_PATH,
        home_path.as_str(),
        sign_in_path.as_str(),
    ] {
        if !path.starts_with('/') {
            bail!("route path must start with '/': {path}");
        }
        if !seen.insert(path) {
            bail!("route path is used more than once: {path}");
        }
    }

    // Widget steps live under the sign-up and sign-in pages.
    let sign_up_steps = format!("{SIGN_UP_PATH}/*rest");
    let sign_in_steps = format!("{}/*rest", sign_in_path.trim_end_matches('/'));
    for base in [SIGN_UP_PATH, sign_in_path.as_str()] {
        let nested = format!("{}/", base.trim_end_matches('/'));
        if let Some(path) = seen.iter().find(|path| path.starts_with(nested.as_str())) {
            bail!("route path {path} is shadowed by the widget steps under {base}");
        }
    }

    let app = Router::new()
        .route(ROOT_PATH, get(root::root))
        .route(&home_path, get(root::home))
        .route(SIGN_UP_PATH, get(pages::sign_up))
        .route(&sign_up_steps, get(pages::sign_up))
        .route(&sign_in_path, get(pages::sign_in))
        .route(&sign_in_steps, get(pages::sign_in))
        .route(HEALTH_PATH, get(health::health).options(health::health))
        .fallback(not_found)
        .layer(Extension(widget))
        .layer(from_fn_with_state(gate, middleware::gate));

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, gate: Arc<GateState>, widget: Arc<WidgetConfig>) -> Result<()> {
    let app = router(gate, widget)?.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry::shutdown_tracer();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
