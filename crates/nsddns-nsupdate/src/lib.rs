// # nsupdate Zone Updater
//
// This crate provides the `ZoneUpdater` implementation that drives the
// BIND `nsupdate` tool as a subprocess.
//
// ## Protocol
//
// One process per update. The transaction is written to the tool's
// standard input as newline-separated directives:
//
// ```text
// del alice.dyn.example.com
// add alice.dyn.example.com 180 A 203.0.113.5
// send
// quit
// ```
//
// ## Outcome Classification
//
// - Anything on standard error is a failure; the text is returned verbatim
// - Empty standard error with a non-zero exit status is a failure
// - Otherwise the update succeeded
//
// ## Process Lifetime
//
// The whole exchange (write, drain, wait) runs under one deadline. When it
// expires the process is killed and reaped before `Timeout` is returned.
// The child is also spawned with `kill_on_drop`, so a cancelled request
// cannot leave a stray tool behind.
//
// ## Constraints
//
// - NO retries (the client retries)
// - NO caching (the pipeline owns the change cache)
// - NO shared state between calls: concurrent updates run independently

use async_trait::async_trait;
use nsddns_core::ServerConfig;
use nsddns_core::address::AddressSet;
use nsddns_core::traits::{UpdateFailure, ZoneUpdater};
use nsddns_core::transaction::UpdateTransaction;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

/// Default time budget for one nsupdate run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Zone updater backed by the `nsupdate` executable
#[derive(Debug, Clone)]
pub struct NsupdateUpdater {
    /// Path of the executable
    program: PathBuf,

    /// Arguments (default: `-l`)
    args: Vec<String>,

    /// TTL of the records written
    ttl: u32,

    /// Deadline for the whole exchange
    timeout: Duration,
}

/// Everything the tool said before exiting
struct Exchange {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    status: ExitStatus,
}

impl NsupdateUpdater {
    /// Create an updater running `program -l`
    ///
    /// # Parameters
    ///
    /// - `program`: Path of the nsupdate executable
    /// - `ttl`: TTL of the records written, in seconds
    /// - `timeout`: Deadline for one run
    pub fn new(program: impl Into<PathBuf>, ttl: u32, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: vec!["-l".to_string()],
            ttl,
            timeout,
        }
    }

    /// Replace the arguments passed to the executable
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Create an updater from the server configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.nsupdate_path, config.ttl, config.timeout())
            .with_args(config.nsupdate_args.iter().cloned())
    }

    /// Path of the executable run for each update
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Deadline for one run, after which the tool is killed
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the tool once with `script` on standard input
    pub async fn run_script(&self, script: &str) -> Result<(), UpdateFailure> {
        let started = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to start {}: {}", self.program.display(), e);
                UpdateFailure::Launch(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let result =
            tokio::time::timeout(self.timeout, communicate(&mut child, script.as_bytes())).await;

        match result {
            Err(_) => {
                tracing::warn!(
                    "{} did not finish within {:?}, killing it",
                    self.program.display(),
                    self.timeout
                );
                if let Err(e) = child.kill().await {
                    tracing::error!("Failed to kill {}: {}", self.program.display(), e);
                }
                Err(UpdateFailure::Timeout)
            }
            Ok(Err(e)) => {
                tracing::error!("I/O with {} failed: {}", self.program.display(), e);
                if let Err(e) = child.kill().await {
                    tracing::debug!("Failed to kill {}: {}", self.program.display(), e);
                }
                Err(UpdateFailure::Launch(format!(
                    "I/O with {} failed: {}",
                    self.program.display(),
                    e
                )))
            }
            Ok(Ok(exchange)) => {
                tracing::debug!(
                    "{} finished in {:?} with {}",
                    self.program.display(),
                    started.elapsed(),
                    exchange.status
                );
                if !exchange.stdout.is_empty() {
                    tracing::debug!(
                        "{} output: {}",
                        self.program.display(),
                        String::from_utf8_lossy(&exchange.stdout).trim_end()
                    );
                }
                classify(&self.program, exchange)
            }
        }
    }
}

#[async_trait]
impl ZoneUpdater for NsupdateUpdater {
    async fn apply(&self, fqdn: &str, addresses: &AddressSet) -> Result<(), UpdateFailure> {
        let transaction = UpdateTransaction::build(fqdn, addresses, self.ttl);
        self.run_script(&transaction.to_script()).await
    }

    fn updater_name(&self) -> &'static str {
        "nsupdate"
    }
}

/// Feed `script` to the child while draining its output, then reap it
async fn communicate(child: &mut Child, script: &[u8]) -> io::Result<Exchange> {
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("stdin not captured"))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr not captured"))?;

    let write = async move {
        // A tool that exits early closes the pipe; its diagnostics decide
        match stdin.write_all(script).await {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
        }
        drop(stdin);
        Ok::<_, io::Error>(())
    };
    let read_stdout = async move {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    };
    let read_stderr = async move {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    };

    let ((), stdout, stderr) = tokio::try_join!(write, read_stdout, read_stderr)?;
    let status = child.wait().await?;

    Ok(Exchange {
        stdout,
        stderr,
        status,
    })
}

fn classify(program: &Path, exchange: Exchange) -> Result<(), UpdateFailure> {
    if !exchange.stderr.is_empty() {
        let diagnostic = String::from_utf8_lossy(&exchange.stderr).into_owned();
        tracing::warn!(
            "{} reported: {}",
            program.display(),
            diagnostic.trim_end()
        );
        return Err(UpdateFailure::ToolError(diagnostic));
    }

    if !exchange.status.success() {
        return Err(UpdateFailure::ToolError(format!(
            "{} exited with {}",
            program.display(),
            exchange.status
        )));
    }

    Ok(())
}
