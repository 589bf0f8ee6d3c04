use std::fmt::{Display, Formatter};

use crate::command::{self, ParseError};
use crate::launcher::{self, LaunchError};
use crate::logging;
use crate::model::{App, UninstallOutcome};
use crate::monitor::{self, MonitorConfig, MonitorVerdict, ProcessProbe};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallError {
    Parse(ParseError),
    Launch(LaunchError),
    Timeout,
}

impl Display for UninstallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "{error}"),
            Self::Launch(error) => write!(f, "failed to start uninstaller: {error}"),
            // A timeout only means completion was not observed in time, not
            // that the uninstall itself failed.
            Self::Timeout => write!(
                f,
                "uninstall monitoring timed out; one or more processes may still be running"
            ),
        }
    }
}

impl std::error::Error for UninstallError {}

impl From<ParseError> for UninstallError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<LaunchError> for UninstallError {
    fn from(value: LaunchError) -> Self {
        Self::Launch(value)
    }
}

/// Runs one uninstall end to end: parse the registry command, launch it
/// elevated, then watch the process tree until it drains or the deadline
/// passes. The first failing stage short-circuits the rest; nothing is
/// retried and no compensating action is taken.
pub fn uninstall(app: &App, probe: &dyn ProcessProbe, config: &MonitorConfig) -> UninstallOutcome {
    match run_stages(app, probe, config) {
        Ok(message) => UninstallOutcome::completed(message),
        Err(error) => {
            logging::error(&format!(
                "uninstall '{}' failed: {error}",
                app.display_name
            ));
            UninstallOutcome::failed(error.to_string())
        }
    }
}

fn run_stages(
    app: &App,
    probe: &dyn ProcessProbe,
    config: &MonitorConfig,
) -> Result<String, UninstallError> {
    let parsed = command::parse(&app.uninstall_string)?;
    logging::info(&format!(
        "uninstall '{}': launching {} ({} args)",
        app.display_name,
        parsed.path,
        parsed.args.len()
    ));

    let pid = launcher::launch_elevated(&parsed.path, &parsed.args)?;
    logging::info(&format!(
        "uninstall '{}': watching process tree rooted at pid {pid}",
        app.display_name
    ));

    match monitor::wait_for_tree_exit(probe, pid, config) {
        MonitorVerdict::Completed => Ok(format!(
            "application {} was uninstalled",
            app.display_name
        )),
        MonitorVerdict::TimedOut => Err(UninstallError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::uninstall;
    use crate::model::App;
    use crate::monitor::{Liveness, MonitorConfig, Pid, ProcessProbe, ProcessRecord};

    struct EmptyProbe;

    impl ProcessProbe for EmptyProbe {
        fn snapshot(&self) -> Result<Vec<ProcessRecord>, String> {
            Ok(Vec::new())
        }

        fn liveness(&self, _pid: Pid) -> Liveness {
            Liveness::Exited
        }
    }

    fn app_with_command(command: &str) -> App {
        App {
            display_name: "Example App".to_string(),
            display_version: "1.0".to_string(),
            publisher: "Example".to_string(),
            install_date: String::new(),
            uninstall_string: command.to_string(),
            install_location: String::new(),
            display_icon: String::new(),
            registry_key: "HKLM\\...\\Example".to_string(),
            estimated_size: 0,
        }
    }

    #[test]
    fn parse_failure_short_circuits_into_outcome() {
        let app = app_with_command("notanexe /x");
        let outcome = uninstall(&app, &EmptyProbe, &MonitorConfig::default());

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("no executable"));
        assert!(outcome.message.is_none());
    }

    #[test]
    fn missing_uninstaller_short_circuits_into_outcome() {
        let app = app_with_command(r#""C:\definitely\gone\unins000.exe" /S"#);
        let outcome = uninstall(&app, &EmptyProbe, &MonitorConfig::default());

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("executable not found"));
    }
}
