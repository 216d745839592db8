//! Capture process spawning and output wiring.
//!
//! A spawned capture process communicates with its session exclusively
//! through [`CaptureEvent`]s on an mpsc channel: stdout/stderr reader tasks
//! produce events, and a single consumer per session applies them, keeping
//! buffer writes and state transitions single-writer.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::debug;

use crate::command::CaptureCommand;

/// Lifecycle and data events emitted by a capture process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Raw stdout chunk; may end mid-line.
    Stdout(String),
    /// Raw stderr chunk, for diagnostics only.
    Stderr(String),
    /// The process exited, with its exit code when known.
    Exited(Option<i32>),
}

/// Handle to a spawned capture process.
///
/// The child is kept behind a mutex so exit checks and termination signals
/// can be issued while the reader tasks are still draining output.
#[derive(Debug)]
pub struct CaptureHandle {
    child: Arc<Mutex<Option<Child>>>,
    pid: Option<u32>,
}

impl CaptureHandle {
    /// Spawn the capture command with stdout/stderr piped onto an event
    /// channel.
    ///
    /// The returned receiver yields [`CaptureEvent::Stdout`] and
    /// [`CaptureEvent::Stderr`] chunks as they arrive, followed by a single
    /// [`CaptureEvent::Exited`] once stdout closes and the process is reaped.
    pub fn spawn(
        command: &CaptureCommand,
    ) -> std::io::Result<(Self, mpsc::UnboundedReceiver<CaptureEvent>)> {
        let (program, args) = command.invocation();
        debug!("spawning capture process: program='{}' args={:?}", program, args);

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let child = Arc::new(Mutex::new(Some(child)));

        let (tx, rx) = mpsc::unbounded_channel();

        if let Some(mut out) = stdout {
            let tx = tx.clone();
            let child = Arc::clone(&child);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                loop {
                    match out.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                            if tx.send(CaptureEvent::Stdout(chunk)).is_err() {
                                // Receiver gone; nobody cares about exit either.
                                return;
                            }
                        }
                    }
                }
                let code = await_exit_code(&child).await;
                let _ = tx.send(CaptureEvent::Exited(code));
            });
        }

        if let Some(mut err) = stderr {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                loop {
                    match err.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                            if tx.send(CaptureEvent::Stderr(chunk)).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }

        Ok((Self { child, pid }, rx))
    }

    /// OS process id, when the process has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Whether the process has already terminated.
    pub fn has_exited(&self) -> bool {
        let mut guard = match self.child.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(Some(_))),
            None => true,
        }
    }

    /// Send a termination signal (SIGTERM on Unix) without waiting for exit.
    pub fn signal_term(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            if let Some(pid) = self.pid {
                let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
                if ret == 0 {
                    return Ok(());
                }
                return Err(std::io::Error::last_os_error());
            }
        }

        // No pid available (or non-Unix): fall back to a hard kill.
        let mut guard = self
            .child
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "child lock poisoned"))?;
        match guard.as_mut() {
            Some(child) => child.start_kill(),
            None => Ok(()),
        }
    }

    /// Wait up to `timeout` for the process to exit. Returns whether it did.
    pub async fn wait_exited(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.has_exited() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

/// Poll for the exit status after stdout closes.
///
/// Stdout closing almost always means the process is gone, but reaping can
/// lag by a scheduler tick; bounded polling keeps the reader task from
/// hanging on a process that closed stdout and lived on.
async fn await_exit_code(child: &Arc<Mutex<Option<Child>>>) -> Option<i32> {
    for _ in 0..20 {
        {
            let mut guard = match child.lock() {
                Ok(guard) => guard,
                Err(_) => return None,
            };
            if let Some(child) = guard.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    return status.code();
                }
            } else {
                return None;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    None
}
