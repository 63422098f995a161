//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("llms-txt");
    cmd.env_remove("LLMS_TXT_MAIN_CONTENT_SELECTOR")
        .env_remove("LLMS_TXT_MACHINE_VIEW_MAX_HTML_LENGTH")
        .env_remove("LLMS_TXT_USE_CASE")
        .env_remove("LLMS_TXT_TITLE")
        .env_remove("APP_NAME");
    cmd
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_convert_file() {
    cmd()
        .args(["convert", &get_fixture_path("docs_page.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Installing Acme CLI"))
        .stdout(predicate::str::contains("cargo install acme-cli"))
        .stdout(predicate::str::contains("Pricing").not());
}

#[test]
fn test_cli_convert_stdin() {
    let html = "<html><body><main><h1>Test Page</h1><p>Content here</p></main></body></html>";
    cmd()
        .args(["convert", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Test Page"))
        .stdout(predicate::str::contains("Content here"));
}

#[test]
fn test_cli_convert_custom_selector() {
    let html = r#"<div id="a"><p>First</p></div><div id="b"><p>Second</p></div>"#;
    cmd()
        .args(["convert", "--selector", "#b", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Second"))
        .stdout(predicate::str::contains("First").not());
}

#[test]
fn test_cli_convert_no_selector() {
    cmd()
        .args(["convert", "--no-selector", &get_fixture_path("docs_page.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pricing"))
        .stdout(predicate::str::contains("window.analytics").not());
}

#[test]
fn test_cli_selector_flags_conflict() {
    cmd()
        .args(["convert", "--selector", "main", "--no-selector", "-"])
        .write_stdin("<p>x</p>")
        .assert()
        .failure();
}

#[test]
fn test_cli_convert_truncates() {
    cmd()
        .args(["convert", "--no-selector", "--max-html-length", "1200", &get_fixture_path("docs_page.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("> NOTE: This machine view was generated from a **truncated** version"));
}

#[test]
fn test_cli_convert_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("page.md");

    cmd()
        .args(["convert", "-o", output.to_str().unwrap(), &get_fixture_path("docs_page.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("# Installing Acme CLI"));
}

#[test]
fn test_cli_convert_invalid_file() {
    cmd()
        .args(["convert", "nonexistent.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_convert_verbose() {
    cmd()
        .args(["-v", "convert", &get_fixture_path("docs_page.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("llms-txt"))
        .stderr(predicate::str::contains("Conversion Details"));
}

#[test]
fn test_cli_generate_from_config() {
    cmd()
        .args(["generate", "--config", &get_fixture_path("llms-txt.json")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Acme\n\n> Documentation and API for LLMs and IDEs."))
        .stdout(predicate::str::contains("- [Install](https://example.com/docs/install): Linux, macOS and Windows"))
        .stdout(predicate::str::contains("## Optional"));
}

#[test]
fn test_cli_generate_env_override() {
    cmd()
        .args(["generate", "--config", &get_fixture_path("llms-txt.json")])
        .env("LLMS_TXT_USE_CASE", "custom")
        .assert()
        .success()
        .stdout(predicate::str::contains("> Acme builds developer tools for shipping faster."));
}

#[test]
fn test_cli_generate_missing_config() {
    cmd()
        .args(["generate", "--config", "/nonexistent/llms-txt.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_cli_generate_invalid_env() {
    cmd()
        .args(["generate", "--config", &get_fixture_path("llms-txt.json")])
        .env("LLMS_TXT_MACHINE_VIEW_TRIGGER", "sometimes")
        .assert()
        .failure();
}

#[test]
fn test_completions_offer_flags_the_parser_accepts() {
    let bash = std::path::Path::new(env!("LLMS_TXT_COMPLETIONS_DIR")).join("llms-txt.bash");
    let script = std::fs::read_to_string(bash).unwrap();

    for flag in ["--no-selector", "--max-html-length", "--user-agent"] {
        assert!(script.contains(flag), "completions missing {}", flag);
    }
    for flag in ["--no_selector", "--max_html_length", "--user_agent"] {
        assert!(!script.contains(flag), "completions offer {}", flag);
    }

    cmd()
        .args(["convert", &get_fixture_path("docs_page.html")])
        .args(["--no-selector", "--max-html-length", "0", "--user-agent", "test-agent"])
        .assert()
        .success();
}
