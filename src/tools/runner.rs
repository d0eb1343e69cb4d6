use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::{TilerError, TilerResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const STDERR_TAIL_LINES: usize = 20;

/// Captured output of a successful invocation.
#[derive(Clone, Debug, Default)]
pub struct ToolOutput {
    /// Everything written to stdout.
    pub stdout: Vec<u8>,
    /// Everything written to stderr.
    pub stderr: Vec<u8>,
}

/// An argument vector for an external tool.
///
/// Running it captures stdout/stderr. A non-zero exit status, a spawn failure or an elapsed
/// deadline all surface as [`TilerError::Conversion`]; on deadline the child is killed and reaped.
#[derive(Clone, Debug)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Command for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as lossy strings, for logging and tests.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run to completion, or until `deadline`.
    pub fn run(&self, deadline: Option<Instant>) -> TilerResult<ToolOutput> {
        let name = self.program_name();
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            return Err(TilerError::conversion(format!(
                "deadline elapsed before {name} could start"
            )));
        }

        tracing::debug!(program = %name, args = ?self.arg_strings(), "running external tool");
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TilerError::conversion(format!(
                        "'{}' was not found (is it installed and on PATH?)",
                        self.program.display()
                    ))
                } else {
                    TilerError::conversion(format!("failed to spawn {name}: {e}"))
                }
            })?;

        let stdout_drain = child.stdout.take().map(drain);
        let stderr_drain = child.stderr.take().map(drain);

        let status = wait_with_deadline(&mut child, deadline)
            .map_err(|e| TilerError::conversion(format!("failed to wait for {name}: {e}")))?;
        let stdout = join_drain(stdout_drain, &name)?;
        let stderr = join_drain(stderr_drain, &name)?;

        let Some(status) = status else {
            return Err(TilerError::conversion(format!(
                "{name} timed out after {:.1}s and was killed",
                started.elapsed().as_secs_f64()
            )));
        };
        if !status.success() {
            return Err(TilerError::conversion(format!(
                "{name} exited with {status}: {}",
                stderr_tail(&stderr)
            )));
        }

        tracing::trace!(program = %name, elapsed_ms = started.elapsed().as_millis() as u64, "tool finished");
        Ok(ToolOutput { stdout, stderr })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    name: &str,
) -> TilerResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| TilerError::conversion(format!("{name} output drain thread panicked")))?
            .map_err(|e| TilerError::conversion(format!("{name} output read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// `Ok(None)` means the deadline elapsed and the child was killed.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        "(no diagnostic output)".to_string()
    } else {
        tail
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tools/runner.rs"]
mod tests;
