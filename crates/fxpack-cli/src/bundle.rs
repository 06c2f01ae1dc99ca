//! Bundle runner - hands entry files to an external bundler
//!
//! The bundler is a black box: it receives the entry files, one output file
//! and the configured option bag, and either succeeds or fails.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::BuildError;
use crate::logger;

/// What to bundle
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    pub entry_points: Vec<PathBuf>,
    pub output: PathBuf,
    pub options: &'a Map<String, Value>,
}

/// Transforms entry files into a single output file
pub trait Bundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<(), BuildError>;
}

/// Runs an esbuild-compatible executable
#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: String,
}

impl CommandBundler {
    pub fn new(program: impl Into<String>) -> Self {
        CommandBundler {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn resolve_program(&self) -> Result<PathBuf, BuildError> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return Ok(candidate.to_path_buf());
        }
        which::which(&self.program).map_err(|_| BuildError::BundlerNotFound(self.program.clone()))
    }

    /// Command-line arguments for a request:
    /// `<entries...> --bundle --outfile=<output> <option flags...>`
    pub fn command_args(request: &BundleRequest<'_>) -> Vec<String> {
        let mut args: Vec<String> = request
            .entry_points
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        args.push("--bundle".to_string());
        args.push(format!("--outfile={}", request.output.display()));
        args.extend(option_flags(request.options));
        args
    }
}

impl Bundler for CommandBundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<(), BuildError> {
        let program = self.resolve_program()?;
        let args = Self::command_args(request);

        logger::debug(&format!("Running: {} {}", program.display(), args.join(" ")));

        let output = Command::new(&program)
            .args(&args)
            .output()
            .map_err(|source| BuildError::BundlerLaunch {
                program: self.program.clone(),
                source,
            })?;

        logger::capture_output(&self.program, &output);

        if !output.status.success() {
            return Err(BuildError::BundlerFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Translate the option bag into command-line flags.
///
/// `true` becomes a bare flag, `false` and `null` are omitted, arrays repeat
/// the flag and tables become `--flag:key=value` pairs.
pub fn option_flags(options: &Map<String, Value>) -> Vec<String> {
    let mut flags = Vec::new();
    for (key, value) in options {
        let flag = flag_name(key);
        match value {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => flags.push(format!("--{}", flag)),
            Value::Array(items) => {
                flags.extend(items.iter().map(|item| format!("--{}={}", flag, scalar(item))));
            }
            Value::Object(entries) => {
                flags.extend(
                    entries
                        .iter()
                        .map(|(k, v)| format!("--{}:{}={}", flag, k, scalar(v))),
                );
            }
            other => flags.push(format!("--{}={}", flag, scalar(other))),
        }
    }
    flags
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `keep_names` and `keepNames` both become `keep-names`
fn flag_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c == '_' {
            name.push('-');
        } else if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('-');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_flag_name() {
        assert_eq!(flag_name("keep_names"), "keep-names");
        assert_eq!(flag_name("keepNames"), "keep-names");
        assert_eq!(flag_name("legalComments"), "legal-comments");
        assert_eq!(flag_name("format"), "format");
    }

    #[test]
    fn test_option_flags() {
        let bag = options(json!({
            "format": "cjs",
            "platform": "node",
            "target": "node16",
            "keepNames": true,
            "minify": false,
            "legalComments": "inline",
            "external": ["fs", "path"],
            "define": {"DEBUG": "false"}
        }));
        assert_eq!(
            option_flags(&bag),
            vec![
                "--format=cjs",
                "--platform=node",
                "--target=node16",
                "--keep-names",
                "--legal-comments=inline",
                "--external=fs",
                "--external=path",
                "--define:DEBUG=false",
            ]
        );
    }

    #[test]
    fn test_command_args() {
        let bag = options(json!({"format": "iife"}));
        let request = BundleRequest {
            entry_points: vec![PathBuf::from("src/client.ts"), PathBuf::from("src/server.ts")],
            output: PathBuf::from("dist/out.js"),
            options: &bag,
        };
        assert_eq!(
            CommandBundler::command_args(&request),
            vec![
                "src/client.ts",
                "src/server.ts",
                "--bundle",
                "--outfile=dist/out.js",
                "--format=iife",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_reported() {
        let bundler = CommandBundler::new("fxpack-definitely-not-a-bundler");
        let bag = Map::new();
        let request = BundleRequest {
            entry_points: vec![PathBuf::from("index.ts")],
            output: PathBuf::from("out.js"),
            options: &bag,
        };
        assert!(matches!(
            bundler.bundle(&request),
            Err(BuildError::BundlerNotFound(name)) if name == "fxpack-definitely-not-a-bundler"
        ));
    }
}
