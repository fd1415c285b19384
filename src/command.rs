// External command execution
//
// Every data source goes through a CommandRunner so loaders can be exercised
// against captured output instead of the live system.

use crate::{SourceError, SourceResult};
use std::path::Path;
use std::process::Command;

/// Captured result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub status: Option<i32>,
}

impl CommandOutput {
    pub fn success(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            status: Some(0),
        }
    }

    pub fn failure(status: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success: false,
            status: Some(status),
        }
    }

    /// Stdout of a command that must exit cleanly.
    pub fn into_stdout(self, program: &str) -> SourceResult<String> {
        if self.success {
            return Ok(self.stdout);
        }

        Err(SourceError::CommandFailed {
            program: program.to_string(),
            status: self
                .status
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr: self.stderr.trim().to_string(),
        })
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `program` with `args` and capture its output. Only a failure to
    /// spawn is an error; a non-zero exit is reported through the output.
    fn run<'a>(&self, program: &str, args: &[&'a str]) -> SourceResult<CommandOutput>;

    /// Read a kernel status file such as /proc/mdstat.
    fn read_file(&self, path: &Path) -> SourceResult<String>;
}

/// Runs real commands on the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> SourceResult<CommandOutput> {
        tracing::debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            status: output.status.code(),
        })
    }

    fn read_file(&self, path: &Path) -> SourceResult<String> {
        std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}
