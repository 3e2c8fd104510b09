//! Command-line and environment configuration.

use std::path::PathBuf;

use anyhow::{Context, bail};

pub const SNAPSHOT_ENV: &str = "SPLITLEDGER_SNAPSHOT";

pub const USAGE: &str = "usage: splitledger <snapshot.json> [dashboard|balances|plan]";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Report {
    /// Balances and settlement plan together.
    #[default]
    Dashboard,
    Balances,
    Plan,
}

impl Report {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dashboard" => Some(Report::Dashboard),
            "balances" => Some(Report::Balances),
            "plan" => Some(Report::Plan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub snapshot_path: PathBuf,
    pub report: Report,
}

impl CliConfig {
    /// `args` excludes the program name. A lone report name is accepted when
    /// the snapshot path comes from `SPLITLEDGER_SNAPSHOT`.
    pub fn from_args_and_env(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let args: Vec<String> = args.into_iter().collect();

        let (path_arg, report_arg) = match args.as_slice() {
            [] => (None, None),
            [one] if Report::parse(one).is_some() => (None, Some(one.as_str())),
            [one] => (Some(one.as_str()), None),
            [path, report] => (Some(path.as_str()), Some(report.as_str())),
            _ => bail!("too many arguments\n{USAGE}"),
        };

        let snapshot_path = match path_arg {
            Some(path) => PathBuf::from(path),
            None => env(SNAPSHOT_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .with_context(|| format!("no snapshot given and {SNAPSHOT_ENV} is not set\n{USAGE}"))?,
        };

        let report = match report_arg {
            Some(raw) => Report::parse(raw).with_context(|| format!("unknown report '{raw}'\n{USAGE}"))?,
            None => Report::default(),
        };

        Ok(Self { snapshot_path, report })
    }
}
