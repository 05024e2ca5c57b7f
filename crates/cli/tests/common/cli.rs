//! CLI command execution helpers with automatic timing
//!
//! This module provides a wrapper around the `seismo` binary that
//! measures execution time and provides convenient assertion methods.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// CLI command builder with timing
pub struct SeismoCommand {
    binary_path: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    stdin_data: Option<String>,
}

impl SeismoCommand {
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_seismo")),
            args: Vec::new(),
            env: HashMap::new(),
            stdin_data: None,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Provide stdin data
    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = Some(data.to_string());
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .envs(&self.env)
            // Keep the caller's environment from leaking a config in
            .env_remove("SEISMO_CONFIG")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if self.stdin_data.is_some() {
            command.stdin(Stdio::piped());
        }

        let mut child = command.spawn().context("Failed to spawn command")?;

        if let Some(data) = &self.stdin_data {
            if let Some(mut stdin) = child.stdin.take() {
                use std::io::Write;
                stdin.write_all(data.as_bytes())?;
            }
        }

        let output = child.wait_with_output().context("Failed to wait for command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Temporary data directory with a config file pointing at it
pub struct TestEnv {
    dir: TempDir,
    config_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("config.toml");
        let data_dir = dir.path().join("data");
        std::fs::write(
            &config_path,
            format!(
                "[storage]\ndata_dir = {:?}\n\n[schedule]\nenabled = false\n",
                data_dir.display().to_string()
            ),
        )?;
        Ok(Self { dir, config_path })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// Command with `--config` already pointing at this environment
    pub fn seismo(&self, args: &[&str]) -> SeismoCommand {
        let config = self.config_path.display().to_string();
        let mut command = SeismoCommand::new();
        command.args(&["--config", config.as_str()]).args(args);
        command
    }
}

/// Run a seismo command against an environment and assert success
#[macro_export]
macro_rules! seismo {
    ($env:expr, $($arg:expr),+ $(,)?) => {
        $env.seismo(&[$($arg),+]).assert_success()
    };
}
