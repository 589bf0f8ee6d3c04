use appsweep_core::runtime::{parse_cli_args, run, CliCommand, RuntimeError};

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn list_command_runs_against_a_fresh_scan() {
    run(CliCommand::List).expect("list should always succeed");
}

#[test]
fn export_command_prints_a_document() {
    run(CliCommand::Export).expect("export should always succeed");
}

#[test]
fn unmatched_uninstall_query_reports_not_found() {
    let command = parse_cli_args(&args(&["uninstall", "zzz-appsweep-no-such-app"])).unwrap();
    let error = run(command).expect_err("query should match nothing");
    assert!(matches!(error, RuntimeError::NotFound(_)));
}

#[test]
fn usage_errors_keep_the_command_list_visible() {
    let error = parse_cli_args(&args(&["explode"])).unwrap_err();
    assert!(error.contains("unknown command 'explode'"));
    assert!(error.contains("uninstall <name>"));
}

#[test]
fn multiword_queries_survive_argument_splitting() {
    assert_eq!(
        parse_cli_args(&args(&["uninstall", "Google", "Chrome", "Beta"])).unwrap(),
        CliCommand::Uninstall {
            query: "Google Chrome Beta".to_string()
        }
    );
}
