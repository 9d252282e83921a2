use campus_kernel::config::load_config;
use campus_kernel::domain::config::ApiConfig;
use std::io::Write;

#[test]
fn loads_toml_file_over_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    writeln!(
        file,
        r#"
[server]
port = 9000

[discussion]
service_url = "http://forum.internal:4567"

[certificates]
max_retries = 4
"#
    )
    .expect("write config");

    let cfg: ApiConfig = load_config(Some(file.path())).expect("config loads");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.discussion.service_url, "http://forum.internal:4567");
    assert_eq!(cfg.discussion.timeout_seconds, 5);
    assert_eq!(cfg.certificates.max_retries, 4);
    assert_eq!(cfg.certificates.retry_delay_seconds, 30);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("nope.toml");

    assert!(load_config::<ApiConfig>(Some(missing)).is_err());
}

#[test]
fn wrong_types_fail_to_deserialize() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    writeln!(file, "[server]\nport = \"not a port\"").expect("write config");

    let err = load_config::<ApiConfig>(Some(file.path())).expect_err("bad port");
    assert!(err.to_string().contains("Failed to deserialize config"));
}
