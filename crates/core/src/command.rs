use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{LibrarianError, Result};
use crate::filter::FilterDescriptor;
use crate::schema::FieldSchema;

/// Builds the lookup tool's argument vector: the tool path followed by one
/// token per descriptor, in the order given.
pub fn build_command(
    base_path: &Path,
    tool_name: &str,
    descriptors: &[FilterDescriptor],
) -> Vec<String> {
    let mut argv = Vec::with_capacity(descriptors.len() + 1);
    argv.push(base_path.join(tool_name).to_string_lossy().into_owned());
    argv.extend(
        descriptors
            .iter()
            .map(|descriptor| descriptor.effective_value().to_string()),
    );
    argv
}

/// A fully positional tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCommand {
    argv: Vec<String>,
}

impl ToolCommand {
    pub fn for_schema(
        schema: &FieldSchema,
        base_path: &Path,
        tool_name: &str,
        descriptors: &[FilterDescriptor],
    ) -> Result<Self> {
        let expected = schema.field_count();
        if descriptors.len() != expected {
            return Err(LibrarianError::ArityMismatch {
                expected,
                actual: descriptors.len(),
            });
        }
        Ok(Self {
            argv: build_command(base_path, tool_name, descriptors),
        })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Space-joined form, as a shell would see it.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationMode {
    /// Arguments go straight to the process; nothing is interpreted by a shell.
    #[default]
    Direct,
    /// Legacy: the joined command line runs under `sh -c` unescaped.
    Shell,
}

/// What the tool printed and how it exited. Exit status is reported, not judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutcome {
    pub command_line: String,
    pub output_lines: Vec<String>,
    pub status_code: Option<i32>,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolRunner {
    mode: InvocationMode,
    work_dir: Option<PathBuf>,
}

impl ToolRunner {
    pub fn new(mode: InvocationMode) -> Self {
        Self {
            mode,
            work_dir: None,
        }
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Runs the tool once and blocks until it exits.
    pub fn run(&self, command: &ToolCommand) -> Result<ToolOutcome> {
        let command_line = match self.mode {
            InvocationMode::Direct => command.command_line(),
            InvocationMode::Shell => format!("{} 2>&1", command.command_line()),
        };
        let mut process = match self.mode {
            InvocationMode::Direct => {
                let mut process = Command::new(command.program());
                process.args(command.args());
                process
            }
            InvocationMode::Shell => {
                let mut process = Command::new("sh");
                process.arg("-c").arg(&command_line);
                process
            }
        };
        if let Some(dir) = &self.work_dir {
            process.current_dir(dir);
        }
        let output = process.output().map_err(|source| LibrarianError::Spawn {
            program: PathBuf::from(command.program()),
            source,
        })?;
        let outcome = ToolOutcome {
            command_line,
            output_lines: merged_lines(&output),
            status_code: output.status.code(),
        };
        info!(
            program = %command.program(),
            fields = command.args().len(),
            status = ?outcome.status_code,
            "lookup tool finished"
        );
        for line in &outcome.output_lines {
            debug!(target: "librarian::tool", "{line}");
        }
        if !outcome.success() {
            warn!(status = ?outcome.status_code, "lookup tool exited unsuccessfully");
        }
        Ok(outcome)
    }
}

fn merged_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .chain(String::from_utf8_lossy(&output.stderr).lines())
        .map(str::to_string)
        .collect()
}
