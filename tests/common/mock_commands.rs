/// Canned command execution for integration tests
///
/// Responses are registered per full command line; anything unregistered
/// behaves like a missing binary.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use storage_inventory::{CommandOutput, CommandRunner, SourceError, SourceResult};

#[derive(Default)]
pub struct FixtureRunner {
    commands: HashMap<String, CommandOutput>,
    files: HashMap<PathBuf, String>,
    calls: Mutex<Vec<String>>,
}

fn command_key(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

impl FixtureRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response for `command`, e.g. `"df -P -T"`.
    pub fn register(&mut self, command: &str, output: CommandOutput) -> &mut Self {
        self.commands.insert(command.to_string(), output);
        self
    }

    pub fn register_file(&mut self, path: &str, contents: &str) -> &mut Self {
        self.files.insert(PathBuf::from(path), contents.to_string());
        self
    }

    /// How many times `command` was run.
    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == command)
            .count()
    }
}

impl CommandRunner for FixtureRunner {
    fn run(&self, program: &str, args: &[&str]) -> SourceResult<CommandOutput> {
        let key = command_key(program, args);
        self.calls.lock().unwrap().push(key.clone());

        self.commands
            .get(&key)
            .cloned()
            .ok_or_else(|| SourceError::Spawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    fn read_file(&self, path: &Path) -> SourceResult<String> {
        self.files.get(path).cloned().ok_or_else(|| SourceError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}
