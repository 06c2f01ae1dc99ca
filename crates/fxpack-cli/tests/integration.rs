//! Integration tests for fxpack

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RESOURCE_CONFIG: &str = r#"
[metadata]
path = "package.json"
version_env = "FXPACK_TEST_RELEASE_VERSION"
version_prefix = "v"

[timestamp]
output = "dist/.buildstamp"

[manifest]
output = "fxmanifest.lua"

[[manifest.sections]]
id = "header"
type = "key_value"
data = [{ key = "fx_version", value = "cerulean" }, { key = "game", value = "gta5" }]

[[manifest.sections]]
id = "package"
type = "packageMetadata"
data = [
  { manifest_key = "name", source_key = "name" },
  { manifest_key = "version", source_key = "version" },
  { manifest_key = "description", source_key = "description" },
]

[[manifest.sections]]
id = "client"
type = "list"
singular_key = "client_script"
plural_key = "client_scripts"
data = ["dist/client.js"]

[[manifest.sections]]
id = "server"
type = "list"
singular_key = "server_script"
plural_key = "server_scripts"
data = ["dist/server.js", "dist/db.js"]

[[manifest.sections]]
id = "convars"
type = "convar_category"
category = { name = "Race", description = "Race settings" }
data = [{ description = "Laps per race", name = "race_laps", type = "CV_INT", default = 3 }]

[bundle]
entry_points = ["src/server.ts"]
output = "dist/server.js"
program = "fxpack-test-missing-bundler"
"#;

const EXPECTED_MANIFEST: &str = "fx_version 'cerulean'
game 'gta5'

name 'race'
version '1.0.0'

client_script 'dist/client.js'

server_scripts {
    'dist/server.js',
    'dist/db.js',
}

convar_category 'Race' {
    'Race settings',
    {
        { 'Laps per race', 'race_laps', 'CV_INT', '3' },
    }
}

";

struct Resource {
    dir: TempDir,
}

impl Resource {
    fn new(config: &str) -> io::Result<Self> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("fxpack.toml"), config)?;
        fs::write(
            dir.path().join("package.json"),
            "{\n  \"name\": \"race\",\n  \"version\": \"1.0.0\",\n  \"description\": \"\"\n}\n",
        )?;
        Ok(Resource { dir })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("fxpack.toml")
    }

    fn command(&self) -> Command {
        let mut cmd = fxpack_cmd();
        cmd.current_dir(self.path());
        cmd.env("FXPACK_LOG_DIR", self.path().join("logs"));
        cmd.env_remove("FXPACK_CONFIG");
        cmd.env_remove("FXPACK_TEST_RELEASE_VERSION");
        cmd
    }
}

fn fxpack_cmd() -> Command {
    cargo_bin_cmd!("fxpack")
}

#[test]
fn test_version() {
    fxpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fxpack"));
}

#[test]
fn test_help() {
    fxpack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "fxpack patches package metadata, stamps the build",
        ));
}

#[test]
fn test_short_help_uses_summary() {
    fxpack_cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resource build pipeline"));
}

#[test]
fn test_invalid_command() {
    fxpack_cmd().arg("invalid").assert().failure();
}

#[test]
fn test_check_valid_configuration() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    resource
        .command()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (5 sections, 5 enabled)"));
}

#[test]
fn test_check_reports_every_violation() {
    let config = r#"
[metadata]
path = "package.json"

[timestamp]
style = "custom"

[[manifest.sections]]
type = "key_value"
data = [{ key = "a", value = "b" }]

[[manifest.sections]]
id = "scripts"
type = "list"
data = ["x.lua"]

[bundle]
output = "dist/out.js"
"#;
    let Ok(resource) = Resource::new(config) else {
        return;
    };
    resource
        .command()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration validation failed"))
        .stderr(predicate::str::contains("timestamp.output is required"))
        .stderr(predicate::str::contains("manifest.output is required"))
        .stderr(predicate::str::contains(
            "bundle.entry_points must list at least one entry file",
        ))
        .stderr(predicate::str::contains("section #1: missing 'id'"))
        .stderr(predicate::str::contains(
            "section 'scripts': list section requires 'singular_key'",
        ));
}

#[test]
fn test_check_missing_configuration() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    fxpack_cmd()
        .current_dir(dir.path())
        .env("FXPACK_LOG_DIR", dir.path().join("logs"))
        .env_remove("FXPACK_CONFIG")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fxpack.toml"));
}

#[test]
fn test_render_prints_manifest_without_writing() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    resource
        .command()
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::eq(EXPECTED_MANIFEST));

    assert!(!resource.path().join("fxmanifest.lua").exists());
}

#[test]
fn test_render_applies_version_override() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    resource
        .command()
        .env("FXPACK_TEST_RELEASE_VERSION", "v2.3.4")
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("version '2.3.4'"));

    let metadata = fs::read_to_string(resource.path().join("package.json")).unwrap_or_default();
    assert!(metadata.contains("\"version\": \"1.0.0\""));
    assert!(!resource.path().join("fxmanifest.lua").exists());
}

#[test]
fn test_config_env_var_selects_file() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    let Ok(other) = TempDir::new() else {
        return;
    };
    resource
        .command()
        .current_dir(other.path())
        .env("FXPACK_CONFIG", resource.config_path())
        .arg("check")
        .assert()
        .success();
}

#[test]
fn test_build_skip_bundle() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    resource
        .command()
        .env("FXPACK_TEST_RELEASE_VERSION", "v1.2.0")
        .args(["build", "--skip-bundle"])
        .assert()
        .success();

    let manifest = fs::read_to_string(resource.path().join("fxmanifest.lua")).unwrap_or_default();
    assert!(manifest.contains("version '1.2.0'"));
    assert!(resource.path().join("dist").join(".buildstamp").exists());

    let metadata = fs::read_to_string(resource.path().join("package.json")).unwrap_or_default();
    assert!(metadata.contains("\"version\": \"1.2.0\""));
}

#[test]
fn test_build_fails_without_bundler() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    resource
        .command()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fxpack-test-missing-bundler"));

    assert!(resource.path().join("fxmanifest.lua").exists());
}

#[test]
fn test_init_creates_configuration() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    fxpack_cmd()
        .current_dir(dir.path())
        .env("FXPACK_LOG_DIR", dir.path().join("logs"))
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created successfully"));

    let written = fs::read_to_string(dir.path().join("fxpack.toml")).unwrap_or_default();
    assert!(written.contains("[[manifest.sections]]"));
}

#[test]
fn test_init_declined_overwrite_keeps_file() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    if fs::write(dir.path().join("fxpack.toml"), "keep me").is_err() {
        return;
    }
    fxpack_cmd()
        .current_dir(dir.path())
        .env("FXPACK_LOG_DIR", dir.path().join("logs"))
        .arg("init")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled"));

    assert_eq!(
        fs::read_to_string(dir.path().join("fxpack.toml")).unwrap_or_default(),
        "keep me"
    );
}

#[test]
fn test_release_check_without_repository_succeeds() {
    let Ok(resource) = Resource::new(RESOURCE_CONFIG) else {
        return;
    };
    resource
        .command()
        .args(["release-check", "--delay-secs", "0"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no repository given"));
}
