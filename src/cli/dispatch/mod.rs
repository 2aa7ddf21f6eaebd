//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{gate, identity, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let identity_opts = identity::Options::parse(matches)?;
    let gate_opts = gate::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        identity_url: identity_opts.url,
        widget_script_url: identity_opts.widget_script_url,
        session_cookie: identity_opts.session_cookie,
        public_pages: gate_opts.public_pages,
        public_api: gate_opts.public_api,
        home_path: gate_opts.home_path,
        sign_in_path: gate_opts.sign_in_path,
        api_prefix: gate_opts.api_prefix,
        always_prefixes: gate_opts.always_prefixes,
        excluded_prefixes: gate_opts.excluded_prefixes,
    }))
}
