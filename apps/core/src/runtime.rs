use std::fmt::{Display, Formatter};

use crate::checker::{self, CheckReport};
use crate::config::{self, Config, ConfigError};
use crate::inventory;
use crate::logging;
use crate::model::{App, InventoryDocument, UninstallOutcome};
use crate::monitor;
use crate::orchestrator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    List,
    Export,
    Check,
    Uninstall { query: String },
}

pub fn usage() -> String {
    [
        "usage: appsweep-core <command> [arguments]",
        "commands:",
        "  list              print the display name of every installed application",
        "  export            print the full inventory as JSON",
        "  check             audit the inventory for stale or broken entries",
        "  uninstall <name>  uninstall the application matching <name>",
    ]
    .join("\n")
}

pub fn parse_cli_args(args: &[String]) -> Result<CliCommand, String> {
    let Some((command, rest)) = args.split_first() else {
        return Err(usage());
    };

    match command.as_str() {
        "list" | "export" | "check" if !rest.is_empty() => {
            Err(format!("'{command}' takes no arguments\n\n{}", usage()))
        }
        "list" => Ok(CliCommand::List),
        "export" => Ok(CliCommand::Export),
        "check" => Ok(CliCommand::Check),
        "uninstall" => {
            let query = rest.join(" ").trim().to_string();
            if query.is_empty() {
                return Err(format!("'uninstall' needs an application name\n\n{}", usage()));
            }
            Ok(CliCommand::Uninstall { query })
        }
        other => Err(format!("unknown command '{other}'\n\n{}", usage())),
    }
}

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Encode(serde_json::Error),
    NotFound(String),
    Ambiguous(usize),
    Failed(String),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Encode(error) => write!(f, "failed to encode output: {error}"),
            Self::NotFound(query) => {
                write!(f, "no application found matching '{query}'")
            }
            Self::Ambiguous(count) => write!(
                f,
                "found {count} matching applications; re-run with an exact name"
            ),
            Self::Failed(error) => write!(f, "uninstall failed: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<serde_json::Error> for RuntimeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Dispatches one CLI invocation. Every command starts from a fresh scan;
/// nothing is carried over between runs. Stdout carries only the command's
/// document, diagnostics go to the file log and stderr.
pub fn run(command: CliCommand) -> Result<(), RuntimeError> {
    if let Err(error) = logging::init() {
        eprintln!("[appsweep-core] file logging unavailable: {error}");
    }
    let config = config::load(None)?;

    match command {
        CliCommand::List => {
            let apps = inventory::scan();
            logging::info(&format!("list: {} applications", apps.len()));
            for app in &apps {
                println!("{}", app.display_name);
            }
            Ok(())
        }
        CliCommand::Export => {
            let apps = inventory::scan();
            logging::info(&format!("export: {} applications", apps.len()));
            let document = InventoryDocument::new(apps);
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        CliCommand::Check => {
            let apps = inventory::scan();
            let report = CheckReport::new(checker::check_invalid_apps(&apps));
            logging::info(&format!(
                "check: {} issues across {} applications",
                report.issues.len(),
                apps.len()
            ));
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        CliCommand::Uninstall { query } => run_uninstall(&query, &config),
    }
}

fn run_uninstall(query: &str, config: &Config) -> Result<(), RuntimeError> {
    let apps = inventory::scan();
    let selected = match resolve_query(&apps, query) {
        Ok(app) => app,
        Err(error) => {
            match &error {
                RuntimeError::NotFound(_) => {
                    let outcome = UninstallOutcome::failed(error.to_string());
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                RuntimeError::Ambiguous(_) => {
                    print_candidates(query, &inventory::find_matches(&apps, query));
                }
                _ => {}
            }
            return Err(error);
        }
    };

    logging::info(&format!(
        "uninstall: '{query}' resolved to '{}'",
        selected.display_name
    ));

    let probe = monitor::system_probe();
    let outcome = orchestrator::uninstall(selected, probe.as_ref(), &config.monitor());
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if outcome.success {
        Ok(())
    } else {
        Err(RuntimeError::Failed(
            outcome.error.unwrap_or_else(|| "unknown failure".to_string()),
        ))
    }
}

/// Maps a query to exactly one record or the error the caller must surface.
fn resolve_query<'a>(apps: &'a [App], query: &str) -> Result<&'a App, RuntimeError> {
    let matches = inventory::find_matches(apps, query);
    match matches.len() {
        0 => Err(RuntimeError::NotFound(query.to_string())),
        1 => Ok(matches[0]),
        many => Err(RuntimeError::Ambiguous(many)),
    }
}

fn print_candidates(query: &str, matches: &[&App]) {
    eprintln!("found {} applications matching '{query}':", matches.len());
    for (index, app) in matches.iter().enumerate() {
        eprintln!("  {:2}) {}", index + 1, app.display_name);
    }
    eprintln!("re-run with an unambiguous name, ideally the exact one");
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, resolve_query, CliCommand, RuntimeError};
    use crate::model::App;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn app(name: &str) -> App {
        App {
            display_name: name.to_string(),
            display_version: "1.0".to_string(),
            publisher: String::new(),
            install_date: String::new(),
            uninstall_string: "C:\\Apps\\unins000.exe".to_string(),
            install_location: String::new(),
            display_icon: String::new(),
            registry_key: format!("HKLM\\...\\{name}"),
            estimated_size: 0,
        }
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_cli_args(&args(&["list"])), Ok(CliCommand::List));
        assert_eq!(parse_cli_args(&args(&["export"])), Ok(CliCommand::Export));
        assert_eq!(parse_cli_args(&args(&["check"])), Ok(CliCommand::Check));
    }

    #[test]
    fn uninstall_query_joins_remaining_arguments() {
        assert_eq!(
            parse_cli_args(&args(&["uninstall", "Google", "Chrome"])),
            Ok(CliCommand::Uninstall {
                query: "Google Chrome".to_string()
            })
        );
    }

    #[test]
    fn rejects_missing_or_unknown_commands() {
        assert!(parse_cli_args(&[]).is_err());
        assert!(parse_cli_args(&args(&["install", "x"])).is_err());
        assert!(parse_cli_args(&args(&["uninstall"])).is_err());
        assert!(parse_cli_args(&args(&["list", "extra"])).is_err());
    }

    #[test]
    fn resolves_unique_match() {
        let apps = vec![app("Google Chrome"), app("Firefox")];
        let selected = resolve_query(&apps, "fire").unwrap();
        assert_eq!(selected.display_name, "Firefox");
    }

    #[test]
    fn reports_not_found_and_ambiguous_queries() {
        let apps = vec![
            app("Google Chrome"),
            app("Google Chrome Beta"),
            app("Firefox"),
        ];

        assert!(matches!(
            resolve_query(&apps, "Zzz"),
            Err(RuntimeError::NotFound(_))
        ));
        assert!(matches!(
            resolve_query(&apps, "Chrome"),
            Err(RuntimeError::Ambiguous(2))
        ));
    }
}
