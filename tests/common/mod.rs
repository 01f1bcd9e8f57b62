//! Shared fakes for the integration tests.

#![allow(dead_code)]

use kmod_manager::{CommandError, CommandExecutor, CommandResult, FileStore, StoreError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Replays queued results per program and records every invocation.
///
/// Results are consumed in order; the last one repeats forever.
#[derive(Default)]
pub struct FakeExecutor {
    results: Mutex<HashMap<String, Vec<CommandResult>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, program: &str, result: CommandResult) -> Self {
        self.results
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push(result);
        self
    }

    /// Invocations as "program arg1 arg2"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandExecutor for FakeExecutor {
    fn run_all(&self, program: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let mut call = vec![program];
        call.extend_from_slice(args);
        self.calls.lock().unwrap().push(call.join(" "));

        let mut results = self.results.lock().unwrap();
        match results.get_mut(program) {
            Some(queue) if queue.len() > 1 => Ok(queue.remove(0)),
            Some(queue) => queue
                .first()
                .cloned()
                .ok_or_else(|| CommandError::NotFound(program.to_string())),
            None => Err(CommandError::NotFound(program.to_string())),
        }
    }
}

/// FileStore kept entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files.lock().unwrap().insert(
            PathBuf::from(path),
            content.lines().map(str::to_string).collect(),
        );
        self
    }

    pub fn lines(&self, path: &str) -> Option<Vec<String>> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl FileStore for MemoryStore {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, StoreError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<(), StoreError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut listed: Vec<PathBuf> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|path| path.starts_with(dir) && path.as_path() != dir)
            .cloned()
            .collect();
        listed.sort();
        Ok(listed)
    }
}

/// One loaded module whose name could not be parsed.
pub const LSMOD_NAMELESS: &str = "Module Size Used by\n??? 100 10\n";

pub const LSMOD_LP: &str = "\
Module                  Size  Used by
lp                     20480  0
parport                73728  1 lp
";
