use crate::gate::{
    scope::{DEFAULT_ALWAYS_PREFIXES, DEFAULT_EXCLUDED_PREFIXES},
    DEFAULT_API_PREFIX, DEFAULT_HOME_PATH, DEFAULT_PUBLIC_API, DEFAULT_PUBLIC_PAGES,
    DEFAULT_SIGN_IN_PATH,
};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_PUBLIC_PAGE: &str = "public-page";
pub const ARG_PUBLIC_API: &str = "public-api";
pub const ARG_HOME_PATH: &str = "home-path";
pub const ARG_SIGN_IN_PATH: &str = "sign-in-path";
pub const ARG_API_PREFIX: &str = "api-prefix";
pub const ARG_GATE_ALWAYS: &str = "gate-always";
pub const ARG_GATE_EXCLUDE: &str = "gate-exclude";

#[derive(Debug, Clone)]
pub struct Options {
    pub public_pages: Vec<String>,
    pub public_api: Vec<String>,
    pub home_path: String,
    pub sign_in_path: String,
    pub api_prefix: String,
    pub always_prefixes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
}

impl Options {
    /// Parse gate policy and scope arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a path argument is empty or not absolute.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let many = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|values| {
                    values
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect()
                })
                .unwrap_or_default()
        };

        let path = |id: &str| -> anyhow::Result<String> {
            let value = matches
                .get_one::<String>(id)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            if !value.starts_with('/') {
                anyhow::bail!("--{id} must be an absolute path, got: {value:?}");
            }
            Ok(value)
        };

        Ok(Self {
            public_pages: many(ARG_PUBLIC_PAGE),
            public_api: many(ARG_PUBLIC_API),
            home_path: path(ARG_HOME_PATH)?,
            sign_in_path: path(ARG_SIGN_IN_PATH)?,
            api_prefix: path(ARG_API_PREFIX)?,
            always_prefixes: many(ARG_GATE_ALWAYS),
            excluded_prefixes: many(ARG_GATE_EXCLUDE),
        })
    }
}

fn list_arg(id: &'static str, env: &'static str, help: &'static str, defaults: &[&'static str]) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .env(env)
        .action(ArgAction::Append)
        .value_delimiter(',')
        .default_values(defaults.iter().copied())
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(list_arg(
            ARG_PUBLIC_PAGE,
            "GATEHOUSE_PUBLIC_PAGES",
            "Page patterns reachable without signing in (`/path` or `/prefix(.*)`)",
            DEFAULT_PUBLIC_PAGES,
        ))
        .arg(list_arg(
            ARG_PUBLIC_API,
            "GATEHOUSE_PUBLIC_API",
            "API patterns reachable without signing in",
            DEFAULT_PUBLIC_API,
        ))
        .arg(
            Arg::new(ARG_HOME_PATH)
                .long(ARG_HOME_PATH)
                .help("Home page, where signed-in users are sent from public pages")
                .env("GATEHOUSE_HOME_PATH")
                .default_value(DEFAULT_HOME_PATH),
        )
        .arg(
            Arg::new(ARG_SIGN_IN_PATH)
                .long(ARG_SIGN_IN_PATH)
                .help("Sign-in page, where anonymous users are sent from private routes")
                .env("GATEHOUSE_SIGN_IN_PATH")
                .default_value(DEFAULT_SIGN_IN_PATH),
        )
        .arg(
            Arg::new(ARG_API_PREFIX)
                .long(ARG_API_PREFIX)
                .help("Path prefix identifying API requests")
                .env("GATEHOUSE_API_PREFIX")
                .default_value(DEFAULT_API_PREFIX),
        )
        .arg(list_arg(
            ARG_GATE_ALWAYS,
            "GATEHOUSE_GATE_ALWAYS",
            "Path prefixes that are always gated, even when they look like static files",
            DEFAULT_ALWAYS_PREFIXES,
        ))
        .arg(list_arg(
            ARG_GATE_EXCLUDE,
            "GATEHOUSE_GATE_EXCLUDE",
            "Path prefixes the gate never runs on",
            DEFAULT_EXCLUDED_PREFIXES,
        ))
}
