//! Logger installation for the CLI.

use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::CliError;

/// Parse a level name such as `"info"` or `"DEBUG"`.
pub(crate) fn parse_level(value: &str) -> Result<LevelFilter, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidLogLevel {
        value: value.to_owned(),
    })
}

/// Install a stderr logger at `level`.
///
/// A logger that is already installed is left in place.
pub(crate) fn init(level: LevelFilter) {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .target(Target::Stderr)
        .format_timestamp_millis();
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("info", LevelFilter::Info)]
    #[case("DEBUG", LevelFilter::Debug)]
    #[case(" warn ", LevelFilter::Warn)]
    #[case("off", LevelFilter::Off)]
    fn parses_level_names(#[case] value: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(value).expect("known level"), expected);
    }

    #[rstest]
    fn rejects_unknown_level() {
        let err = parse_level("loud").expect_err("unknown level");
        assert!(matches!(err, CliError::InvalidLogLevel { ref value } if value == "loud"));
    }
}
