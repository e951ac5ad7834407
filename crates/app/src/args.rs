use std::fmt;
use std::path::{Path, PathBuf};

use vocab_core::model::LevelId;

const DEFAULT_DB_PATH: &str = "vocab.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidLevel { raw: String },
    InvalidSession { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidSession { raw } => write!(f, "invalid --session value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Study,
    Quiz,
    Diagnostic,
    Due,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "status" => Some(Self::Status),
            "study" => Some(Self::Study),
            "quiz" => Some(Self::Quiz),
            "diagnostic" => Some(Self::Diagnostic),
            "due" => Some(Self::Due),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub level: Option<LevelId>,
    /// 1-based session number as typed by the user.
    pub session: Option<usize>,
    pub seed: Option<u64>,
}

/// Outcome of parsing: either run something or just show help.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Args),
    Help,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [status]    [--db <sqlite_url>]");
    eprintln!("  app study       [--db <sqlite_url>] [--level <id>] [--session <n>] [--seed <u64>]");
    eprintln!("  app quiz        [--db <sqlite_url>] [--level <id>] [--session <n>] [--seed <u64>]");
    eprintln!("  app diagnostic  [--db <sqlite_url>]");
    eprintln!("  app due         [--db <sqlite_url>]");
    eprintln!("  app reset       [--db <sqlite_url>] [--seed <u64>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:vocab.sqlite3");
    eprintln!("  --level/--session  the furthest unlocked session");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_DB_URL, VOCAB_AI_URL, VOCAB_AI_TIMEOUT_SECS, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Parse arguments after the program name.
    ///
    /// `env_db_url` is the value of `VOCAB_DB_URL`, if set.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown commands, flags or bad values.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut args = argv.into_iter().peekable();

        let command = match args.peek().map(String::as_str) {
            None => Command::Status,
            Some("--help" | "-h" | "help") => return Ok(Parsed::Help),
            Some(first) if first.starts_with("--") => Command::Status,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?;
                args.next();
                command
            }
        };

        let mut parsed = Self {
            command,
            db_url: env_db_url
                .filter(|raw| !raw.trim().is_empty())
                .map_or_else(|| normalize_sqlite_url(DEFAULT_DB_PATH.into()), normalize_sqlite_url),
            level: None,
            session: None,
            seed: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--level" => {
                    let value = require_value(&mut args, "--level")?;
                    let level = value
                        .parse::<LevelId>()
                        .map_err(|_| ArgsError::InvalidLevel { raw: value.clone() })?;
                    parsed.level = Some(level);
                }
                "--session" => {
                    let value = require_value(&mut args, "--session")?;
                    let session = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ArgsError::InvalidSession { raw: value.clone() })?;
                    parsed.session = Some(session);
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    let seed = value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    parsed.seed = Some(seed);
                }
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Parsed::Run(parsed))
    }
}

/// Turn a path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist.
///
/// # Errors
///
/// Returns an error if the URL has no path or the directory cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        // Other sqlite URL forms (shared memory, file: URIs) are passed through.
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, ArgsError> {
        Args::parse(args.iter().map(ToString::to_string), None)
    }

    fn run(args: &[&str]) -> Args {
        match parse(args).unwrap() {
            Parsed::Run(args) => args,
            Parsed::Help => panic!("expected a command"),
        }
    }

    #[test]
    fn no_arguments_means_status() {
        let args = run(&[]);
        assert_eq!(args.command, Command::Status);
        assert!(args.db_url.starts_with("sqlite://"));
        assert!(args.db_url.ends_with("vocab.sqlite3"));
    }

    #[test]
    fn flags_without_command_mean_status() {
        let args = run(&["--db", "sqlite::memory:"]);
        assert_eq!(args.command, Command::Status);
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn study_accepts_position_and_seed() {
        let args = run(&["study", "--level", "3", "--session", "2", "--seed", "42"]);
        assert_eq!(args.command, Command::Study);
        assert_eq!(args.level, Some(LevelId::new(3)));
        assert_eq!(args.session, Some(2));
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn env_url_is_used_unless_flag_overrides() {
        let parsed = Args::parse(
            ["due".to_string()],
            Some("sqlite:///tmp/vocab.db".to_string()),
        )
        .unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Args {
                command: Command::Due,
                db_url: "sqlite:///tmp/vocab.db".into(),
                level: None,
                session: None,
                seed: None,
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse(&["fly"]).unwrap_err(),
            ArgsError::UnknownCommand("fly".into())
        );
        assert_eq!(
            parse(&["quiz", "--level", "0"]).unwrap_err(),
            ArgsError::InvalidLevel { raw: "0".into() }
        );
        assert_eq!(
            parse(&["quiz", "--session", "0"]).unwrap_err(),
            ArgsError::InvalidSession { raw: "0".into() }
        );
        assert_eq!(
            parse(&["reset", "--seed"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--seed" }
        );
        assert_eq!(
            parse(&["status", "--verbose"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--help"]).unwrap(), Parsed::Help);
        assert_eq!(parse(&["study", "-h"]).unwrap(), Parsed::Help);
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/vocab.db".into());
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("data/vocab.db"));
    }
}
