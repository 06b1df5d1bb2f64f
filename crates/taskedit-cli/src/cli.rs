use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser};
use taskedit_core::FieldName;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

/// One `--set FIELD=VALUE` edit. The value is kept raw and parsed by
/// the dialog according to the field's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
    pub field: FieldName,
    pub raw: String,
}

impl std::str::FromStr for FieldAssignment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got: {s}"))?;
        let field = k
            .parse::<FieldName>()
            .with_context(|| format!("in --set {s}"))?;
        Ok(Self {
            field,
            raw: v.to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskedit",
    version,
    about = "Edit one task record and push the changed fields to the records API"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "taskeditrc")]
    pub taskeditrc: Option<PathBuf>,

    /// Record to edit.
    #[arg(long = "id")]
    pub id: u64,

    /// FIELD=VALUE; an empty VALUE clears the field.
    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<FieldAssignment>()),
        action = ArgAction::Append
    )]
    pub sets: Vec<FieldAssignment>,

    /// Print the update payload instead of sending it.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl GlobalCli {
    pub fn parse_args(raw: Vec<OsString>) -> Self {
        Self::parse_from(raw)
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use taskedit_core::FieldName;

    use super::{FieldAssignment, GlobalCli};

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_field_assignments() {
        let set: FieldAssignment = "file_no=15".parse().expect("parse");
        assert_eq!(set.field, FieldName::FileNo);
        assert_eq!(set.raw, "15");

        let clear: FieldAssignment = "remarks=".parse().expect("parse");
        assert_eq!(clear.raw, "");

        assert!("due=tomorrow".parse::<FieldAssignment>().is_err());
        assert!("file_no".parse::<FieldAssignment>().is_err());
    }

    #[test]
    fn parses_full_command_line() {
        let cli = GlobalCli::parse_args(args(&[
            "taskedit",
            "-vv",
            "--rc",
            "api.timeout=5",
            "--id",
            "7",
            "--set",
            "file_no=15",
            "--set",
            "status=CLOSED",
            "--dry-run",
        ]));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.id, 7);
        assert_eq!(cli.sets.len(), 2);
        assert_eq!(cli.sets[1].field, FieldName::Status);
        assert_eq!(cli.rc_overrides[0].key, "api.timeout");
        assert!(cli.dry_run);
    }
}
