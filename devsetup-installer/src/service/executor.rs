//! Script execution service
//!
//! Runs one install script as a child process:
//! - Checking the script exists before launching the interpreter
//! - Answering yes/no prompts on the child's stdin
//! - Capturing stdout and stderr into an append-only buffer
//! - Streaming each output line to a callback
//! - Resolving success or failure from the exit status
//!
//! Prompt answering is a best-effort heuristic. Any output chunk containing
//! `?`, `[Y/n]` or `[y/N]` queues another `y` for stdin. It only handles
//! single-character affirmative prompts and has no fallback for scripts that
//! expect anything else.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::InstallerConfig;
use crate::error::{InstallError, SpawnError};
use crate::service::output_buffer::{LineSplitter, OutputBuffer};

/// Callback receiving each captured output line
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Response written to the child's stdin for every detected prompt
const AFFIRMATIVE: &[u8] = b"y\n";

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Answers queued for the stdin writer before new ones are dropped
const PENDING_ANSWERS: usize = 64;

/// Service trait for running install scripts
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Runs a script to completion
    ///
    /// # Arguments
    /// * `script` - Path of the install script
    /// * `on_line` - Called for every non-blank output line as it arrives
    ///
    /// # Returns
    /// The outcome of a script that was launched, or `InstallError::Spawn`
    /// when it could not be launched at all
    async fn run(&self, script: &Path, on_line: LineSink) -> Result<ScriptOutcome, InstallError>;
}

/// Result of a launched script
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutcome {
    /// Exit status; `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
    /// stdout and stderr, in arrival order
    pub output: String,
    pub stderr: String,
    /// Set when the script was killed for exceeding the configured timeout
    pub timed_out: Option<Duration>,
}

impl ScriptOutcome {
    pub fn success(&self) -> bool {
        self.timed_out.is_none() && self.exit_code == Some(0)
    }

    /// The error describing why the script failed, `None` on success
    pub fn failure(&self) -> Option<InstallError> {
        if let Some(limit) = self.timed_out {
            return Some(InstallError::TimedOut(limit));
        }
        if self.success() {
            return None;
        }
        Some(InstallError::ScriptFailure {
            code: self.exit_code,
            stderr: self.stderr.clone(),
        })
    }
}

/// Whether an output chunk looks like it ends in a yes/no question
pub fn looks_like_prompt(text: &str) -> bool {
    text.contains('?') || text.contains("[Y/n]") || text.contains("[y/N]")
}

/// Runs install scripts under a command interpreter (bash by default)
pub struct ShellExecutor {
    config: InstallerConfig,
}

impl ShellExecutor {
    /// Creates a new shell executor
    pub fn new(config: InstallerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Fails early for paths the interpreter would only reject after starting
    async fn check_script(script: &Path) -> Result<(), SpawnError> {
        match tokio::fs::metadata(script).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(SpawnError::NotAFile(script.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SpawnError::ScriptNotFound(script.to_path_buf()))
            }
            Err(source) => Err(SpawnError::Inaccessible {
                path: script.to_path_buf(),
                source,
            }),
        }
    }

    fn command(&self, script: &Path) -> Command {
        let mut command = Command::new(&self.config.interpreter);
        command
            .arg(script)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ScriptExecutor for ShellExecutor {
    async fn run(&self, script: &Path, on_line: LineSink) -> Result<ScriptOutcome, InstallError> {
        Self::check_script(script).await?;

        let mut child = self
            .command(script)
            .spawn()
            .map_err(|source| SpawnError::Interpreter {
                interpreter: self.config.interpreter.clone(),
                source,
            })?;

        info!(
            "Running {} {} (pid {:?})",
            self.config.interpreter,
            script.display(),
            child.id()
        );

        let buffer = OutputBuffer::new();

        let exit_code = match self.config.script_timeout {
            None => capture(&mut child, buffer.clone(), on_line).await?,
            Some(limit) => {
                let captured =
                    tokio::time::timeout(limit, capture(&mut child, buffer.clone(), on_line)).await;
                match captured {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(
                            "Script {} exceeded timeout of {:?}, killing it",
                            script.display(),
                            limit
                        );
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill timed out script: {}", e);
                        }
                        let (output, stderr) = buffer.contents();
                        return Ok(ScriptOutcome {
                            exit_code: None,
                            output,
                            stderr,
                            timed_out: Some(limit),
                        });
                    }
                }
            }
        };

        debug!(
            "Script {} exited with {:?}",
            script.display(),
            exit_code
        );

        let (output, stderr) = buffer.contents();
        Ok(ScriptOutcome {
            exit_code,
            output,
            stderr,
            timed_out: None,
        })
    }
}

/// Drives the child's pipes until it exits and returns its exit code
///
/// The stdin writer and stderr reader run as tasks in a `JoinSet`, so they are
/// aborted when this future is dropped on timeout.
async fn capture(
    child: &mut Child,
    buffer: OutputBuffer,
    on_line: LineSink,
) -> Result<Option<i32>, InstallError> {
    let mut tasks = JoinSet::new();

    let (answers, answer_rx) = mpsc::channel(PENDING_ANSWERS);
    let writer = child
        .stdin
        .take()
        .map(|stdin| tasks.spawn(answer_prompts(stdin, answer_rx)));

    // answer a leading prompt before any output is seen
    answer(&answers);

    if let Some(stderr) = child.stderr.take() {
        tasks.spawn(forward_stderr(stderr, buffer.clone(), Arc::clone(&on_line)));
    }

    if let Some(mut stdout) = child.stdout.take() {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        let mut lines = LineSplitter::default();

        loop {
            let n = stdout.read(&mut chunk).await?;
            if n == 0 {
                break;
            }

            let bytes = &chunk[..n];
            buffer.append_stdout(bytes);
            for line in lines.push(bytes) {
                on_line(&line);
            }

            if looks_like_prompt(&String::from_utf8_lossy(bytes)) {
                answer(&answers);
            }
        }

        if let Some(line) = lines.finish() {
            on_line(&line);
        }
    }

    // the writer may be parked on a full pipe nobody reads
    drop(answers);
    if let Some(writer) = writer {
        writer.abort();
    }

    let status = child.wait().await?;

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if !e.is_cancelled() {
                warn!("Script pipe task failed: {}", e);
            }
        }
    }

    Ok(status.code())
}

/// Queues an affirmative answer without waiting on the child
///
/// Answers are dropped while the queue is full or once stdin has closed.
fn answer(answers: &mpsc::Sender<()>) {
    if let Err(TrySendError::Full(())) = answers.try_send(()) {
        debug!("Prompt answer queue full, dropping answer");
    }
}

/// Writes one affirmative answer per queued prompt; stops once the pipe is closed
async fn answer_prompts(mut stdin: ChildStdin, mut answers: mpsc::Receiver<()>) {
    while answers.recv().await.is_some() {
        let written = async {
            stdin.write_all(AFFIRMATIVE).await?;
            stdin.flush().await
        }
        .await;

        if let Err(e) = written {
            debug!("Child stdin closed, no longer answering prompts: {}", e);
            break;
        }
    }
}

async fn forward_stderr<R: AsyncRead + Unpin>(mut stderr: R, buffer: OutputBuffer, on_line: LineSink) {
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut lines = LineSplitter::default();

    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buffer.append_stderr(&chunk[..n]);
                for line in lines.push(&chunk[..n]) {
                    on_line(&line);
                }
            }
            Err(e) => {
                warn!("Failed to read script stderr: {}", e);
                break;
            }
        }
    }

    if let Some(line) = lines.finish() {
        on_line(&line);
    }
}
