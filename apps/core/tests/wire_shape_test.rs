use appsweep_core::model::{App, InventoryDocument, UninstallOutcome};

fn sample_app() -> App {
    App {
        display_name: "Example App".to_string(),
        display_version: "2.1.0".to_string(),
        publisher: "Example Corp".to_string(),
        install_date: "20240315".to_string(),
        uninstall_string: "\"C:\\Program Files\\Example\\unins000.exe\" /S".to_string(),
        install_location: "C:\\Program Files\\Example".to_string(),
        display_icon: "C:\\Program Files\\Example\\app.ico".to_string(),
        registry_key:
            "HKLM\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\Example".to_string(),
        estimated_size: 204800,
    }
}

#[test]
fn export_document_uses_registry_value_names() {
    let json = serde_json::to_value(InventoryDocument::new(vec![sample_app()])).unwrap();

    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());

    let app = &json["apps"][0];
    for key in [
        "DisplayName",
        "DisplayVersion",
        "Publisher",
        "InstallDate",
        "UninstallString",
        "InstallLocation",
        "DisplayIcon",
        "RegistryKey",
        "EstimatedSize",
    ] {
        assert!(app.get(key).is_some(), "missing field {key}");
    }
    assert_eq!(app["EstimatedSize"], 204800);
}

#[test]
fn successful_outcome_omits_error_and_matches() {
    let outcome = UninstallOutcome::completed("application Example App was uninstalled".into());
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    assert!(json.get("matches").is_none());
    assert_eq!(
        json["message"],
        "application Example App was uninstalled"
    );
}

#[test]
fn failed_outcome_omits_message() {
    let outcome = UninstallOutcome::failed("executable not found: C:\\gone.exe".into());
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["success"], false);
    assert!(json.get("message").is_none());
    assert_eq!(json["error"], "executable not found: C:\\gone.exe");
}

#[test]
fn outcome_round_trips_through_json() {
    let outcome = UninstallOutcome::ambiguous(vec![sample_app()]);
    let encoded = serde_json::to_string(&outcome).unwrap();
    let decoded: UninstallOutcome = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, outcome);
}
