use crate::identity::DEFAULT_SESSION_COOKIE;
use clap::{Arg, ArgMatches, Command};

pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_WIDGET_SCRIPT_URL: &str = "widget-script-url";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub widget_script_url: String,
    pub session_cookie: String,
}

impl Options {
    /// Parse identity provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing or empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let required = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            url: required(ARG_IDENTITY_URL)?,
            widget_script_url: required(ARG_WIDGET_SCRIPT_URL)?,
            session_cookie: required(ARG_SESSION_COOKIE)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity provider endpoint used to verify session tokens")
                .long_help(
                    "Identity provider endpoint used to verify session tokens.\n\nThe gate POSTs {\"token\": \"...\"} and expects {\"user_id\": \"...\"} back. 401, 403 and 404 mean the session is not valid.",
                )
                .env("GATEHOUSE_IDENTITY_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_WIDGET_SCRIPT_URL)
                .long(ARG_WIDGET_SCRIPT_URL)
                .help("URL of the hosted sign-up/sign-in widget script")
                .env("GATEHOUSE_WIDGET_SCRIPT_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Cookie carrying the identity provider session token")
                .env("GATEHOUSE_SESSION_COOKIE")
                .default_value(DEFAULT_SESSION_COOKIE),
        )
}
