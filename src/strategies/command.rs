// External command pipes: pdftotext and the ghostscript text device
//
// Tool availability is a first-class Failed outcome, not a crash, so the
// cascade degrades gracefully on hosts without poppler or ghostscript.
// Every spawn runs under a bounded timeout; a killed child reports
// Failed("timeout ...") and is not retried within the cascade pass.

use std::io::{ErrorKind, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::document::Document;
use crate::strategies::{Outcome, Strategy, StrategyKind};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STDERR_SNIPPET: usize = 200;

/// Invokes one external text extractor and captures its standard output.
pub struct CommandPipe {
    name: &'static str,
    program: &'static str,
    pre_args: &'static [&'static str],
    post_args: &'static [&'static str],
    timeout: Duration,
}

impl CommandPipe {
    /// `pdftotext <file> -`
    pub fn pdftotext(timeout: Duration) -> Self {
        Self {
            name: "pdftotext",
            program: "pdftotext",
            pre_args: &[],
            post_args: &["-"],
            timeout,
        }
    }

    /// `gs -sDEVICE=txtwrite -sOutputFile=- <file>`
    pub fn gs_txtwrite(timeout: Duration) -> Self {
        Self {
            name: "gs-txtwrite",
            program: "gs",
            pre_args: &[
                "-dNOPAUSE",
                "-dBATCH",
                "-dQUIET",
                "-sDEVICE=txtwrite",
                "-sOutputFile=-",
            ],
            post_args: &[],
            timeout,
        }
    }
}

impl Strategy for CommandPipe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::CommandPipe
    }

    fn attempt(&self, doc: &Document) -> Outcome {
        let mut cmd = Command::new(self.program);
        cmd.args(self.pre_args);
        cmd.arg(doc.path());
        cmd.args(self.post_args);

        match run_with_timeout(&mut cmd, self.timeout) {
            Err(reason) => Outcome::Failed(reason),
            Ok(None) => Outcome::Failed(format!("timeout after {}s", self.timeout.as_secs())),
            Ok(Some(captured)) if !captured.status.success() => Outcome::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                captured.status,
                stderr_snippet(&captured.stderr)
            )),
            Ok(Some(captured)) => {
                Outcome::Text(String::from_utf8_lossy(&captured.stdout).into_owned())
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run a command with piped stdio under a deadline. `Ok(None)` means the
/// child was killed on timeout. A missing executable comes back as
/// `Err("unavailable: ...")`.
pub(crate) fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
) -> Result<Option<Captured>, String> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(format!("unavailable: {} not installed", program));
        }
        Err(e) => return Err(format!("failed to spawn {}: {}", program, e)),
    };

    // Drain the pipes on their own threads so a chatty child can't fill a
    // pipe buffer and deadlock against try_wait polling.
    let stdout = spawn_drain(child.stdout.take());
    let stderr = spawn_drain(child.stderr.take());

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(Some(Captured {
                    status,
                    stdout: join_drain(stdout),
                    stderr: join_drain(stderr),
                }));
            }
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(format!("wait on {} failed: {}", program, e)),
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn stderr_snippet(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.chars().count() > STDERR_SNIPPET {
        let cut: String = trimmed.chars().take(STDERR_SNIPPET).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}
