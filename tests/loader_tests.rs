//! External mixin loading from directories, globs, inline options and
//! options files.

mod common;

use std::fs;

use common::{expand_with, record};
use sassy_mixins::mixins::{load_external, MixinRegistry};
use sassy_mixins::{MixinError, MixinOptions};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn directory_files_become_record_mixins() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("reset.json"), r#"{"margin": 0, "padding": 0}"#).unwrap();
    fs::write(dir.path().join("README.md"), "not a mixin").unwrap();

    let css = expand_with(
        MixinOptions::new().with_mixins_dir(dir.path()),
        "body { @include reset; }",
    )
    .unwrap();
    assert_eq!(css, "body {\n  margin: 0;\n  padding: 0;\n}\n");
}

#[test]
fn later_sources_overwrite_earlier_ones() {
    let dir = tempdir().unwrap();
    let from_dir = dir.path().join("dir");
    let from_glob = dir.path().join("glob");
    fs::create_dir_all(&from_dir).unwrap();
    fs::create_dir_all(&from_glob).unwrap();
    fs::write(from_dir.join("m.json"), r#"{"from": "dir"}"#).unwrap();
    fs::write(from_glob.join("m.yml"), "from: glob\n").unwrap();
    let pattern = format!("{}/*.yml", from_glob.display());

    let options = MixinOptions::new()
        .with_mixins_dir(&from_dir)
        .with_mixins_files(pattern.clone());
    assert_eq!(
        expand_with(options.clone(), "a { @include m; }").unwrap(),
        "a {\n  from: glob;\n}\n"
    );

    let options = options.with_record("m", record(json!({ "from": "inline" })));
    assert_eq!(
        expand_with(options, "a { @include m; }").unwrap(),
        "a {\n  from: inline;\n}\n"
    );
}

#[test]
fn failed_load_registers_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.json"), r#"{"ok": 1}"#).unwrap();
    fs::write(dir.path().join("b.json"), "{ not json").unwrap();

    let mut registry = MixinRegistry::new();
    let err = load_external(&mut registry, &MixinOptions::new().with_mixins_dir(dir.path()))
        .unwrap_err();
    match err {
        MixinError::Load { path, reason, .. } => {
            assert!(path.ends_with("b.json"));
            assert_eq!(reason, "invalid JSON");
        }
        other => panic!("expected Load, got {other:?}"),
    }
    assert!(registry.is_empty());
}

#[test]
fn glob_match_with_unsupported_extension_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("m.txt"), "x").unwrap();
    let pattern = format!("{}/*", dir.path().display());

    let mut registry = MixinRegistry::new();
    let err = load_external(&mut registry, &MixinOptions::new().with_mixins_files(pattern))
        .unwrap_err();
    assert_eq!(err.kind(), "Load");
}

#[test]
fn load_external_counts_every_source() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::write(dir.path().join("b.yaml"), "x: 1\n").unwrap();

    let options = MixinOptions::new()
        .with_mixins_dir(dir.path())
        .with_record("c", record(json!({})))
        .with_callback("d", |_| Ok(None));
    let mut registry = MixinRegistry::new();
    assert_eq!(load_external(&mut registry, &options).unwrap(), 4);
    assert_eq!(registry.names(), vec!["a", "b", "c", "d"]);
}

#[test]
fn options_file_resolves_directories_relative_to_itself() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("mixins")).unwrap();
    fs::write(dir.path().join("mixins").join("btn.yaml"), "cursor: pointer\n").unwrap();
    let config = dir.path().join("sassy.yaml");
    fs::write(
        &config,
        "mixinsDir: mixins\nsilent: true\nmixins:\n  pad: { padding: 1em }\n",
    )
    .unwrap();

    let options = MixinOptions::from_path(&config).unwrap();
    assert!(options.silent);
    let css = expand_with(
        options,
        "a { @include btn; @include pad; @include missing; }",
    )
    .unwrap();
    assert_eq!(css, "a {\n  cursor: pointer;\n  padding: 1em;\n}\n");
}

#[test]
fn options_file_with_unknown_extension_is_a_config_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("sassy.toml");
    fs::write(&config, "silent = true").unwrap();
    let err = MixinOptions::from_path(&config).unwrap_err();
    assert_eq!(err.kind(), "Config");
}
