//! The documentation compiler capability.
//!
//! [`DocCompiler`] is the seam between the pipeline and the external
//! compiler. [`LibdocCommand`] runs the compiler as a child process with both
//! output streams captured, so nothing it prints reaches the terminal.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use kwdoc_shared::{KwdocError, LibdocConfig, Result};

/// Captured result of one compiler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOutput {
    /// Whether the compiler exited successfully.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CompilerOutput {
    /// A successful invocation with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Lists keywords of, and writes HTML documentation for, a library or
/// resource file.
///
/// Implementations are not assumed to be re-entrant: callers issue one
/// invocation at a time.
pub trait DocCompiler {
    /// List the keyword names of `source`, one per stdout line.
    fn list_keywords(&self, source: &str) -> Result<CompilerOutput>;

    /// Write the HTML documentation of `source` to `out_file`, titled `title`.
    fn generate_html(&self, source: &str, out_file: &Path, title: &str) -> Result<CompilerOutput>;
}

/// Runs `<interpreter> -m <module>` as a child process.
#[derive(Debug, Clone)]
pub struct LibdocCommand {
    interpreter: String,
    module: String,
}

impl LibdocCommand {
    /// Create a runner from the `[libdoc]` config section.
    pub fn new(config: &LibdocConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            module: config.module.clone(),
        }
    }

    /// Check that the interpreter runs and can import the compiler module.
    pub fn probe(&self) -> Result<()> {
        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(format!("import {}", self.module))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                KwdocError::environment(format!(
                    "failed to run `{}`: {e}. Is it installed?",
                    self.interpreter
                ))
            })?;

        if !output.status.success() {
            return Err(KwdocError::environment(format!(
                "`{}` cannot import `{}`: {}",
                self.interpreter,
                self.module,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!(interpreter = %self.interpreter, module = %self.module, "documentation compiler available");
        Ok(())
    }

    fn run<I, S>(&self, args: I) -> Result<CompilerOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(&self.interpreter)
            .arg("-m")
            .arg(&self.module)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                KwdocError::compiler(format!("failed to spawn `{}`: {e}", self.interpreter))
            })?;

        let result = CompilerOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(status = ?output.status, stderr_len = result.stderr.len(), "compiler finished");
        Ok(result)
    }
}

impl DocCompiler for LibdocCommand {
    fn list_keywords(&self, source: &str) -> Result<CompilerOutput> {
        self.run([source, "list"])
    }

    fn generate_html(&self, source: &str, out_file: &Path, title: &str) -> Result<CompilerOutput> {
        self.run([
            OsStr::new("--name"),
            OsStr::new(title),
            OsStr::new(source),
            out_file.as_os_str(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_interpreter() -> LibdocCommand {
        LibdocCommand::new(&LibdocConfig {
            interpreter: "kwdoc-test-no-such-interpreter".into(),
            module: "robot.libdoc".into(),
        })
    }

    #[test]
    fn probe_reports_missing_interpreter_as_environment_error() {
        let err = missing_interpreter().probe().unwrap_err();
        assert!(matches!(err, KwdocError::Environment(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn spawn_failure_is_a_compiler_error() {
        let err = missing_interpreter().list_keywords("BuiltIn").unwrap_err();
        assert!(matches!(err, KwdocError::Compiler(_)));
    }

    #[test]
    fn output_constructors() {
        assert!(CompilerOutput::ok("Log\n").success);
        let failed = CompilerOutput::failed("boom");
        assert!(!failed.success);
        assert_eq!(failed.stderr, "boom");
    }
}
