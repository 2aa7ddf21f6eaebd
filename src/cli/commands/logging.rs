use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted in `GATEHOUSE_LOG_LEVEL`, by verbosity count.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

const MAX_VERBOSITY: u8 = 5;

/// Accepts a verbosity count (`0..=5`) or one of [`LOG_LEVELS`], case-insensitive.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(count) = level.parse::<u8>() {
            return if count <= MAX_VERBOSITY {
                Ok(count)
            } else {
                Err(format!("verbosity count must be at most {MAX_VERBOSITY}"))
            };
        }

        let level = level.to_lowercase();
        LOG_LEVELS
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level, expected one of: {}", LOG_LEVELS.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help(
                "Raise log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace); \
                 GATEHOUSE_LOG_LEVEL takes error, warn, info, debug or trace",
            )
            .env("GATEHOUSE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
