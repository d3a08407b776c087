//! External mixin loading.
//!
//! Populates a registry from the sources named in [`MixinOptions`], in order:
//! directories, then glob patterns, then inline mixins. Each data file
//! (`.json`, `.yaml`, `.yml`) defines one record mixin named after its file
//! stem. A failure anywhere aborts the whole load and leaves the registry
//! untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::MixinOptions;
use crate::errors::MixinError;
use crate::mixins::registry::MixinRegistry;
use crate::mixins::types::{MixinKind, Record};

/// Extensions recognised as mixin data files.
pub const DATA_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Loads every external mixin named by `options` into `registry`.
///
/// Returns the number of definitions registered. Later sources overwrite
/// earlier ones with the same name.
pub fn load_external(registry: &mut MixinRegistry, options: &MixinOptions) -> Result<usize, MixinError> {
    let mut staged: Vec<(String, MixinKind)> = Vec::new();

    for dir in &options.mixins_dir {
        for (name, record) in load_directory(dir)? {
            staged.push((name, MixinKind::Record(record)));
        }
    }
    for pattern in &options.mixins_files {
        for (name, record) in load_glob(pattern)? {
            staged.push((name, MixinKind::Record(record)));
        }
    }
    for (name, source) in &options.mixins {
        staged.push((name.clone(), source.to_kind()));
    }

    let count = staged.len();
    for (name, kind) in staged {
        debug!(mixin = %name, kind = kind.label(), "registered external mixin");
        registry.register(&name, kind);
    }
    if count > 0 {
        info!(count, "loaded external mixins");
    }
    Ok(count)
}

/// Loads every data file directly inside `dir`, sorted by file name.
/// Files with other extensions are skipped.
pub fn load_directory(dir: &Path) -> Result<Vec<(String, Record)>, MixinError> {
    if !dir.is_dir() {
        return Err(MixinError::load_reason(dir, "not a readable directory"));
    }

    let mut loaded = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in entries {
        let entry = entry.map_err(|e| MixinError::load(dir, "cannot read directory", Some(e)))?;
        if !entry.file_type().is_file() || !is_data_file(entry.path()) {
            continue;
        }
        loaded.push(load_file(entry.path())?);
    }
    Ok(loaded)
}

/// Loads every match of a glob pattern. A match that is not a data file is
/// an error.
pub fn load_glob(pattern: &str) -> Result<Vec<(String, Record)>, MixinError> {
    let paths = glob::glob(pattern)
        .map_err(|e| MixinError::load(pattern, "invalid glob pattern", Some(e)))?;

    let mut loaded = Vec::new();
    for path in paths {
        let path: PathBuf = path.map_err(|e| MixinError::load(pattern, "cannot read match", Some(e)))?;
        if !path.is_file() {
            continue;
        }
        if !is_data_file(&path) {
            return Err(MixinError::load_reason(
                &path,
                "unsupported file type, expected .json, .yaml or .yml",
            ));
        }
        loaded.push(load_file(&path)?);
    }
    Ok(loaded)
}

/// Reads one data file into a `(name, record)` pair.
pub fn load_file(path: &Path) -> Result<(String, Record), MixinError> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| MixinError::load_reason(path, "file name is not valid UTF-8"))?
        .to_string();

    let text = fs::read_to_string(path).map_err(|e| MixinError::load(path, "cannot read file", Some(e)))?;

    let value: Value = match extension(path).as_deref() {
        Some("json") => {
            serde_json::from_str(&text).map_err(|e| MixinError::load(path, "invalid JSON", Some(e)))?
        }
        Some("yaml" | "yml") => {
            serde_yaml::from_str(&text).map_err(|e| MixinError::load(path, "invalid YAML", Some(e)))?
        }
        _ => {
            return Err(MixinError::load_reason(
                path,
                "unsupported file type, expected .json, .yaml or .yml",
            ))
        }
    };

    match value {
        Value::Object(record) => {
            debug!(mixin = %name, path = %path.display(), "read mixin file");
            Ok((name, record))
        }
        _ => Err(MixinError::load_reason(path, "top level must be a mapping")),
    }
}

fn is_data_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| DATA_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
