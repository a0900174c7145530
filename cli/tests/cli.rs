use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// The binary with an empty home and none of our variables set, so only the
/// test decides which settings exist.
fn privnote(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("privnote"));
    cmd.env("HOME", home.path())
        .env_remove("PRIVNOTE_EXPIRES")
        .env_remove("PRIVNOTE_DO_NOT_PROMPT")
        .env_remove("PRIVNOTE_NOTIFY_EMAIL")
        .env_remove("PRIVNOTE_NOTIFY_REFERENCE")
        .env_remove("PRIVNOTE_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_expiry_periods() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--expires"))
        .stdout(predicate::str::contains("expire after 1st read"))
        .stdout(predicate::str::contains("--do-not-prompt"));
}

#[test]
fn prints_completion_script() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("privnote"));
}

#[test]
fn unknown_expiry_flag_is_a_usage_error() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .args(["--expires", "2h"])
        .write_stdin("hello world")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("2h"));
}

#[test]
fn unknown_expiry_from_env_fails_before_sending() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .env("PRIVNOTE_EXPIRES", "2h")
        .write_stdin("hello world")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid expiry `2h`"));
}

#[test]
fn unknown_expiry_from_config_file_fails() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join(".privnote"), "expires=fortnight\n").unwrap();

    privnote(&home)
        .write_stdin("hello world")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid expiry `fortnight`"));
}

#[test]
fn nothing_to_send() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .write_stdin("")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: nothing to send"));
}

#[test]
fn missing_file_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("absent.txt");

    privnote(&home)
        .arg("--file")
        .arg(&path)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.txt"));
}

#[test]
fn empty_file_is_rejected() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("empty.txt");
    fs::write(&path, "").unwrap();

    privnote(&home)
        .arg("-f")
        .arg(&path)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("the note is empty"));
}

#[test]
fn missing_config_file_is_reported() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .args(["--config-file", "/nonexistent/privnote.conf"])
        .write_stdin("hello world")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn invalid_boolean_is_reported() {
    let home = TempDir::new().unwrap();

    privnote(&home)
        .env("PRIVNOTE_DO_NOT_PROMPT", "sometimes")
        .write_stdin("hello world")
        .assert()
        .failure()
        .stderr(predicate::str::contains("do_not_prompt"));
}

#[cfg(unix)]
#[test]
fn foreign_non_unicode_variable_is_ignored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let home = TempDir::new().unwrap();

    privnote(&home)
        .env("SOME_BINARY_VAR", OsStr::from_bytes(b"\xff\xfe"))
        .write_stdin("")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: nothing to send"));
}

#[cfg(unix)]
#[test]
fn non_unicode_privnote_variable_is_reported() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let home = TempDir::new().unwrap();

    privnote(&home)
        .env("PRIVNOTE_NOTIFY_EMAIL", OsStr::from_bytes(b"me\xff@example.com"))
        .write_stdin("hello world")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("PRIVNOTE_NOTIFY_EMAIL is not valid UTF-8"));
}

#[test]
fn config_file_line_without_value_is_reported() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join(".privnote"), "expires=1h\ndo_not_prompt\n").unwrap();

    privnote(&home)
        .write_stdin("hello world")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}
