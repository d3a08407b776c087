//! Options for a processing run.
//!
//! `MixinOptions` deserializes from YAML or JSON with camelCase keys:
//!
//! ```yaml
//! mixinsDir: mixins
//! mixinsFiles: ["vendor/*.json", "theme/*.yml"]
//! mixins:
//!   clearfix:
//!     "&::after": { content: "''", display: table, clear: both }
//! silent: false
//! maxDepth: 64
//! ```
//!
//! Callback mixins cannot be written in a file and are added with
//! [`MixinOptions::with_callback`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::MixinError;
use crate::mixins::types::{CallSite, MixinCallback, MixinKind, Record};
use crate::mixins::{ExpandOptions, MAX_EXPANSION_DEPTH};

/// An inline mixin given through options.
#[derive(Clone)]
pub enum MixinSource {
    Record(Record),
    Callback(MixinCallback),
}

impl MixinSource {
    pub fn to_kind(&self) -> MixinKind {
        match self {
            MixinSource::Record(record) => MixinKind::Record(record.clone()),
            MixinSource::Callback(callback) => MixinKind::Callback(Rc::clone(callback)),
        }
    }
}

impl fmt::Debug for MixinSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinSource::Record(record) => f.debug_tuple("Record").field(record).finish(),
            MixinSource::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Everything that configures one run: where external mixins come from and
/// how expansion behaves.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MixinOptions {
    /// Directories whose data files each define one record mixin.
    #[serde(deserialize_with = "one_or_many")]
    pub mixins_dir: Vec<PathBuf>,
    /// Glob patterns whose matches each define one record mixin.
    #[serde(deserialize_with = "one_or_many")]
    pub mixins_files: Vec<String>,
    /// Inline mixins, registered after directories and globs.
    #[serde(deserialize_with = "inline_mixins")]
    pub mixins: Vec<(String, MixinSource)>,
    pub silent: bool,
    pub max_depth: Option<usize>,
}

impl Default for MixinOptions {
    fn default() -> Self {
        Self {
            mixins_dir: Vec::new(),
            mixins_files: Vec::new(),
            mixins: Vec::new(),
            silent: false,
            max_depth: Some(MAX_EXPANSION_DEPTH),
        }
    }
}

impl MixinOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from a `.json`, `.yaml` or `.yml` file.
    ///
    /// Relative directories and glob patterns are resolved against the
    /// directory containing the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MixinError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MixinError::config(path, format!("cannot read file: {e}")))?;

        let mut options: MixinOptions = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&text)
                .map_err(|e| MixinError::config(path, e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&text)
                .map_err(|e| MixinError::config(path, e.to_string()))?,
            _ => {
                return Err(MixinError::config(
                    path,
                    "unsupported format, expected .json, .yaml or .yml",
                ))
            }
        };

        if let Some(base) = path.parent() {
            options.resolve_relative_to(base);
        }
        Ok(options)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for dir in &mut self.mixins_dir {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        for pattern in &mut self.mixins_files {
            if Path::new(pattern.as_str()).is_relative() {
                *pattern = base.join(pattern.as_str()).to_string_lossy().into_owned();
            }
        }
    }

    pub fn with_mixins_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mixins_dir.push(dir.into());
        self
    }

    pub fn with_mixins_files(mut self, pattern: impl Into<String>) -> Self {
        self.mixins_files.push(pattern.into());
        self
    }

    pub fn with_record(mut self, name: impl Into<String>, record: Record) -> Self {
        self.mixins.push((name.into(), MixinSource::Record(record)));
        self
    }

    /// Adds a callback mixin. Returning `Ok(None)` inserts nothing at the call site.
    pub fn with_callback<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&CallSite<'_>) -> Result<Option<Record>, MixinError> + 'static,
    {
        self.mixins
            .push((name.into(), MixinSource::Callback(Rc::new(callback))));
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Expansion options for this configuration.
    pub fn expand_options(&self, trace: bool) -> ExpandOptions {
        ExpandOptions {
            silent: self.silent,
            max_depth: self.max_depth,
            trace,
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Inline mixins keep the order they were written in.
fn inline_mixins<'de, D>(deserializer: D) -> Result<Vec<(String, MixinSource)>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(name, value)| match value {
            Value::Object(record) => Ok((name, MixinSource::Record(record))),
            other => Err(D::Error::custom(format!(
                "mixin `{name}` must be a mapping, found {}",
                json_type(&other)
            ))),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
