use crate::{
    api::{self, GateState, WidgetConfig},
    gate::{GatePolicy, GateScope, RouteMatcher},
    identity::RemoteIdentity,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity_url: String,
    pub widget_script_url: String,
    pub session_cookie: String,
    pub public_pages: Vec<String>,
    pub public_api: Vec<String>,
    pub home_path: String,
    pub sign_in_path: String,
    pub api_prefix: String,
    pub always_prefixes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
}

/// Build the gate from the parsed arguments.
///
/// # Errors
/// Returns an error if a route pattern is invalid or the identity provider URL is unusable.
pub fn build_gate(args: &Args) -> Result<GateState> {
    let public_pages =
        RouteMatcher::new(&args.public_pages).context("Invalid public page pattern")?;
    let public_api = RouteMatcher::new(&args.public_api).context("Invalid public API pattern")?;

    let policy = GatePolicy::new(public_pages, public_api)
        .with_home_path(args.home_path.clone())
        .with_sign_in_path(args.sign_in_path.clone())
        .with_api_prefix(args.api_prefix.clone());

    let scope = GateScope::new(args.always_prefixes.clone(), args.excluded_prefixes.clone())
        .context("Invalid gate scope")?;

    let identity = RemoteIdentity::new(&args.identity_url)
        .with_context(|| format!("Invalid identity provider URL: {}", args.identity_url))?;

    Ok(GateState::new(
        policy,
        scope,
        Arc::new(identity),
        args.session_cookie.clone(),
    ))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the gate cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let gate = build_gate(&args)?;

    debug!("Gate: {:?}", gate);
    info!(
        public_pages = ?args.public_pages,
        public_api = ?args.public_api,
        "Gate configured"
    );

    let widget = WidgetConfig::new(args.widget_script_url, args.home_path);

    api::new(args.port, Arc::new(gate), Arc::new(widget)).await
}
