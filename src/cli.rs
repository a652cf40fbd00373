use crate::communication::console::OutputFormat;
use std::path::PathBuf;
use thiserror::Error;

const COUNT_SPECIFIER: &str = "-vc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub vehicle_count: usize,
    pub config_path: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Rejections that stop the program before the simulation starts. The message is
/// what gets printed to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Usage: traffic -vc <vehicleCount> [--config <path>] [--json]")]
    Usage,

    #[error("Error, invalid item count specifier.")]
    InvalidSpecifier,

    #[error("Error, vehicle count value out of range.")]
    InvalidCount,

    #[error("Error, unknown option '{0}'.")]
    UnknownOption(String),
}

/// Parses everything after the program name: `-vc <count>` first, then options.
///
/// Only the shape of the count is checked here; its range depends on the config.
pub fn parse_args<I>(args: I) -> Result<CliArgs, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let specifier = args.next().ok_or(UsageError::Usage)?;
    let count = args.next().ok_or(UsageError::Usage)?;
    if specifier != COUNT_SPECIFIER {
        return Err(UsageError::InvalidSpecifier);
    }
    let vehicle_count = count
        .trim()
        .parse::<usize>()
        .map_err(|_| UsageError::InvalidCount)?;

    let mut config_path = None;
    let mut format = OutputFormat::Console;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or(UsageError::Usage)?;
                config_path = Some(PathBuf::from(path));
            }
            "--json" => format = OutputFormat::Json,
            _ => return Err(UsageError::UnknownOption(arg)),
        }
    }

    Ok(CliArgs {
        vehicle_count,
        config_path,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, UsageError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn plain_count() {
        let args = parse(&["-vc", "25"]).unwrap();
        assert_eq!(args.vehicle_count, 25);
        assert_eq!(args.config_path, None);
        assert_eq!(args.format, OutputFormat::Console);
    }

    #[test]
    fn options_after_count() {
        let args = parse(&["-vc", "10", "--json", "--config", "lights.json"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.config_path, Some(PathBuf::from("lights.json")));
    }

    #[test]
    fn missing_arguments_print_usage() {
        assert_eq!(parse(&[]), Err(UsageError::Usage));
        assert_eq!(parse(&["-vc"]), Err(UsageError::Usage));
        assert_eq!(parse(&["-vc", "10", "--config"]), Err(UsageError::Usage));
    }

    #[test]
    fn wrong_specifier() {
        assert_eq!(parse(&["-vx", "10"]), Err(UsageError::InvalidSpecifier));
        assert_eq!(parse(&["-vcc", "10"]), Err(UsageError::InvalidSpecifier));
    }

    #[test]
    fn malformed_count() {
        assert_eq!(parse(&["-vc", "ten"]), Err(UsageError::InvalidCount));
        assert_eq!(parse(&["-vc", "-5"]), Err(UsageError::InvalidCount));
    }

    #[test]
    fn unknown_option() {
        assert_eq!(
            parse(&["-vc", "10", "--fast"]),
            Err(UsageError::UnknownOption("--fast".to_string()))
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            UsageError::InvalidCount.to_string(),
            "Error, vehicle count value out of range."
        );
        assert!(UsageError::Usage.to_string().starts_with("Usage: traffic -vc"));
    }
}
