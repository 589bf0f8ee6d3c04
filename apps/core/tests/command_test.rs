use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use appsweep_core::command::{parse, ParseError};

fn unique_exe_path(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "appsweep-{label}-{}-{unique}.exe",
        std::process::id()
    ))
}

#[test]
fn parses_existing_unquoted_uninstaller() {
    let exe = unique_exe_path("unquoted");
    fs::write(&exe, b"ok").expect("should create temp uninstaller");

    let parsed = parse(&format!("{} /SILENT", exe.display())).expect("parse should succeed");
    fs::remove_file(&exe).expect("should clean temp uninstaller");

    assert_eq!(parsed.path, exe.display().to_string());
    assert_eq!(parsed.args, vec!["/SILENT".to_string()]);
}

#[test]
fn parses_existing_quoted_uninstaller_with_switches() {
    let exe = unique_exe_path("quoted");
    fs::write(&exe, b"ok").expect("should create temp uninstaller");

    let command = format!("\"{}\" /S /D=C:\\dest", exe.display());
    let parsed = parse(&command).expect("parse should succeed");
    fs::remove_file(&exe).expect("should clean temp uninstaller");

    assert_eq!(parsed.path, exe.display().to_string());
    assert_eq!(
        parsed.args,
        vec!["/S".to_string(), "/D=C:\\dest".to_string()]
    );
}

#[test]
fn rejects_uninstaller_missing_from_disk() {
    let missing = unique_exe_path("missing");
    let error = parse(&format!("{} /S", missing.display())).unwrap_err();
    assert_eq!(
        error,
        ParseError::MissingExecutable(missing.display().to_string())
    );
}

#[test]
fn rejects_command_without_recognized_executable() {
    let error = parse("notanexe /x").unwrap_err();
    assert!(matches!(error, ParseError::NoExecutable(_)));
}
