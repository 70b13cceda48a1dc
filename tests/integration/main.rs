//! Integration tests for stackvault

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn stackvault() -> Command {
        let mut cmd = cargo_bin_cmd!("stackvault");
        cmd.env_remove("STACKVAULT_CONFIG");
        cmd
    }

    /// Command running inside `dir` with an isolated config file
    fn stackvault_in(dir: &Path) -> Command {
        let mut cmd = stackvault();
        cmd.current_dir(dir)
            .arg("--config")
            .arg(dir.join("stackvault.toml"));
        cmd
    }

    fn write_product(dir: &Path, versions: &str) {
        fs::write(
            dir.join("product.toml"),
            format!("[product]\nname = \"Storage\"\n\n{}", versions),
        )
        .unwrap();
    }

    const V1_FRESH: &str = r#"
[[versions]]
name = "v1"
stack = "Bucket"
template = "v1.json"
locked = true
"#;

    #[test]
    fn help_displays() {
        stackvault()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content-addressed template version cache"));
    }

    #[test]
    fn version_displays() {
        stackvault()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stackvault"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        stackvault_in(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("stackvault.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        stackvault_in(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[sink]"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stackvault.toml"), "[sink\n").unwrap();

        stackvault_in(dir.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn digest_prints_content_address() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.json"), r#"{"Resources": {}}"#).unwrap();

        stackvault_in(dir.path())
            .args(["digest", "t.json"])
            .assert()
            .success()
            .stdout(predicate::str::is_match("^[0-9a-f]{64}  [0-9a-f]{64}\\.json\n$").unwrap());
    }

    #[test]
    fn digest_ignores_formatting() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"b": 1, "a": 2}"#).unwrap();
        fs::write(dir.path().join("b.json"), "{\n  \"a\": 2,\n  \"b\": 1\n}").unwrap();

        let a = stackvault_in(dir.path()).args(["digest", "a.json"]).output().unwrap();
        let b = stackvault_in(dir.path()).args(["digest", "b.json"]).output().unwrap();
        assert_eq!(a.stdout, b.stdout);
    }

    #[test]
    fn synth_records_and_reuses_versions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("v1.json"), r#"{"Resources": {"A": {}}}"#).unwrap();
        write_product(dir.path(), V1_FRESH);

        stackvault_in(dir.path())
            .args(["synth", "product.toml", "--record", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"outcome\": \"fresh\""));

        assert!(dir
            .path()
            .join("product-stack-snapshots")
            .join("Storage.Bucket.v1.template.json")
            .exists());
        assert!(dir.path().join(".stackvault").join("journal.log").exists());

        stackvault_in(dir.path())
            .args(["manifest", "lookup", "Storage", "Bucket", "v1", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Storage/Bucket/v1"));

        fs::write(dir.path().join("v2.json"), r#"{"Resources": {"B": {}}}"#).unwrap();
        write_product(
            dir.path(),
            r#"
[[versions]]
name = "v1"
stack = "Bucket"
from_history = true

[[versions]]
name = "v2"
stack = "Bucket"
template = "v2.json"
"#,
        );

        stackvault_in(dir.path())
            .args(["synth", "product.toml", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::is_match("(?m)^v2\tfresh\t.*\n^v1\tcached\t").unwrap());
    }

    #[test]
    fn synth_locked_drift_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("v1.json"), r#"{"Resources": {"A": {}}}"#).unwrap();
        write_product(dir.path(), V1_FRESH);

        stackvault_in(dir.path())
            .args(["synth", "product.toml"])
            .assert()
            .success();

        fs::write(dir.path().join("v1.json"), r#"{"Resources": {"Changed": {}}}"#).unwrap();

        stackvault_in(dir.path())
            .args(["synth", "product.toml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Template has changed for locked version v1"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn synth_history_without_record_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("stackvault.toml"),
            "[stacks.Bucket]\nbucket = \"legacy\"\n",
        )
        .unwrap();
        write_product(
            dir.path(),
            "[[versions]]\nname = \"v1\"\nstack = \"Bucket\"\nfrom_history = true\n",
        );

        stackvault_in(dir.path())
            .args(["synth", "product.toml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found in manifest"));
    }

    #[test]
    fn manifest_lookup_missing() {
        let dir = TempDir::new().unwrap();
        stackvault_in(dir.path())
            .args(["manifest", "lookup", "P", "S", "v1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found in manifest"));
    }

    #[test]
    fn manifest_show_empty_json() {
        let dir = TempDir::new().unwrap();
        stackvault_in(dir.path())
            .args(["manifest", "show", "--format", "json"])
            .assert()
            .success()
            .stdout("[]\n");
    }
}
