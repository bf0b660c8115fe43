use assert_cmd::Command;
use assert_cmd::cargo;
use std::io::prelude::*;
use std::path::Path;
use tempfile::tempdir;
use zip::write::{FileOptions, ZipWriter};

fn create_nupkg(path: &Path, files: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in files {
        zip.start_file(*name, FileOptions::<()>::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn pkgfold() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("pkgfold"));
    cmd.env_remove("PKGFOLD_ROOT")
        .env_remove("PKGFOLD_PACKAGES")
        .env_remove("PKGFOLD_MACHINE_CONFIG");
    cmd
}

#[test]
fn test_end_to_end_install_and_uninstall() {
    let work = tempdir().unwrap();
    let archive = work.path().join("Foo.1.0.0.nupkg");
    create_nupkg(
        &archive,
        &[
            ("[Content_Types].xml", "<Types/>"),
            ("lib/net8.0/Foo.dll", "binary"),
        ],
    );
    let root = work.path().join("store");

    pkgfold()
        .arg("install")
        .arg("Foo")
        .arg("1.0")
        .arg(&archive)
        .arg("--save-mode")
        .arg("archive-and-files")
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicates::str::contains("Added package 'Foo 1.0.0'"));

    let package_dir = root.join("foo.1.0.0");
    assert!(package_dir.join("foo.1.0.0.nupkg").is_file());
    assert!(package_dir.join("lib/net8.0/Foo.dll").is_file());
    assert!(!package_dir.join("[Content_Types].xml").exists());

    // Second install is a warning, not a failure
    pkgfold()
        .arg("install")
        .arg("foo")
        .arg("1.0.0")
        .arg(&archive)
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicates::str::contains("already exists"));

    pkgfold()
        .arg("exists")
        .arg("FOO")
        .arg("1.0.0")
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicates::str::diff("true\n"));

    pkgfold()
        .arg("uninstall")
        .arg("Foo")
        .arg("1.0.0")
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicates::str::contains("Removed package 'Foo 1.0.0'"));
    assert!(!package_dir.exists());

    pkgfold()
        .arg("uninstall")
        .arg("Foo")
        .arg("1.0.0")
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicates::str::contains("does not exist"));

    pkgfold()
        .arg("exists")
        .arg("Foo")
        .arg("1.0.0")
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicates::str::diff("false\n"));
}

#[test]
fn test_root_from_environment() {
    let work = tempdir().unwrap();
    let archive = work.path().join("Bar.2.0.0.nupkg");
    create_nupkg(&archive, &[("content/readme.txt", "hi")]);
    let root = work.path().join("env-store");

    pkgfold()
        .env("PKGFOLD_ROOT", &root)
        .arg("install")
        .arg("Bar")
        .arg("2.0.0")
        .arg(&archive)
        .assert()
        .success();

    assert!(root.join("bar.2.0.0/bar.2.0.0.nupkg").is_file());
}

#[test]
fn test_default_root_is_packages_under_cwd() {
    let work = tempdir().unwrap();
    let archive = work.path().join("Baz.1.0.0.nupkg");
    create_nupkg(&archive, &[("content/readme.txt", "hi")]);

    pkgfold()
        .current_dir(work.path())
        .arg("install")
        .arg("Baz")
        .arg("1.0.0")
        .arg(&archive)
        .assert()
        .success();

    assert!(work.path().join("packages/baz.1.0.0/baz.1.0.0.nupkg").is_file());
}

#[test]
fn test_install_malformed_archive_fails() {
    let work = tempdir().unwrap();
    let archive = work.path().join("Broken.1.0.0.nupkg");
    std::fs::write(&archive, b"not a zip").unwrap();
    let root = work.path().join("store");

    pkgfold()
        .arg("install")
        .arg("Broken")
        .arg("1.0.0")
        .arg(&archive)
        .arg("--root")
        .arg(&root)
        .assert()
        .failure();

    pkgfold()
        .arg("exists")
        .arg("Broken")
        .arg("1.0.0")
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicates::str::diff("false\n"));
}

#[test]
fn test_invalid_identity_fails() {
    let work = tempdir().unwrap();

    pkgfold()
        .arg("exists")
        .arg("../escape")
        .arg("1.0.0")
        .arg("--root")
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid argument 'identity'"));

    pkgfold()
        .arg("exists")
        .arg("Foo")
        .arg("not-a-version")
        .arg("--root")
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("not a valid package version"));
}

#[test]
fn test_restore_settings_outputs_json() {
    let work = tempdir().unwrap();
    let project_dir = work.path().join("app");
    std::fs::create_dir_all(&project_dir).unwrap();
    std::fs::write(
        project_dir.join("pkgfold.json"),
        r#"{
            "packageSources": {"one": "/feeds/one", "two": "/feeds/two"},
            "disabledPackageSources": {"two": "true"},
            "fallbackPackageFolders": {"shared": "/opt/shared"}
        }"#,
    )
    .unwrap();
    let frameworks = work.path().join("frameworks.json");
    std::fs::write(
        &frameworks,
        r#"[
            {"name": "net8.0", "metadata": {"RestoreAdditionalProjectSources": "/feeds/extra"}},
            {"name": "net472", "metadata": {"RestoreAdditionalProjectFallbackFoldersExcludes": "/opt/shared"}}
        ]"#,
    )
    .unwrap();

    let output = pkgfold()
        .env("HOME", work.path())
        .env("XDG_CONFIG_HOME", work.path().join("config"))
        .arg("restore-settings")
        .arg("--project")
        .arg(project_dir.join("app.csproj"))
        .arg("--packages-path")
        .arg("pkgs")
        .arg("--per-framework")
        .arg(&frameworks)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let settings: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        settings["sources"],
        serde_json::json!(["/feeds/one", "/feeds/extra"])
    );
    assert_eq!(settings["fallback_folders"], serde_json::json!([]));
    assert_eq!(
        settings["packages_path"],
        serde_json::json!(project_dir.join("pkgs"))
    );
    assert_eq!(
        settings["config_file_paths"][0],
        serde_json::json!(project_dir.join("pkgfold.json"))
    );
}

#[test]
fn test_restore_settings_clear_keyword() {
    let work = tempdir().unwrap();
    let project_dir = work.path().join("app");
    std::fs::create_dir_all(&project_dir).unwrap();
    std::fs::write(
        project_dir.join("pkgfold.json"),
        r#"{"packageSources": {"one": "/feeds/one"}}"#,
    )
    .unwrap();

    pkgfold()
        .env("HOME", work.path())
        .env("XDG_CONFIG_HOME", work.path().join("config"))
        .arg("restore-settings")
        .arg("--project")
        .arg(project_dir.join("app.csproj"))
        .arg("--packages-path")
        .arg("pkgs")
        .arg("--source")
        .arg("clear")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""sources": []"#));
}
