//! Per-session capture state.

use std::sync::Mutex;
use std::time::SystemTime;

use tracing::info;

use mobile_log_mcp_capture::{CaptureHandle, LineBuffer};
use mobile_log_mcp_core::Platform;

/// State of a log capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Process spawned, settle check pending
    Starting,
    /// Process believed alive and streaming output
    Streaming,
    /// Explicitly stopped by the caller
    Stopped,
    /// Process died on its own (or never survived startup)
    Failed,
}

impl CaptureState {
    /// Get the state name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Starting => "starting",
            CaptureState::Streaming => "streaming",
            CaptureState::Stopped => "stopped",
            CaptureState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A log capture session.
///
/// Holds the spawned process handle, the bounded line buffer, and the state
/// machine. The event pump task is the only writer of lines and of
/// exit-driven state transitions; operations read through short-lived locks.
#[derive(Debug)]
pub struct LogSession {
    /// Caller-supplied session identifier
    id: String,

    /// Target platform
    platform: Platform,

    /// Automation server URL, kept for reference only
    server_url: Option<String>,

    /// Device the capture is bound to, resolved once at start
    device_id: Option<String>,

    /// Printable form of the spawned command
    command_line: String,

    /// Capture process handle; emptied on explicit stop
    process: Mutex<Option<CaptureHandle>>,

    /// Bounded buffer of captured lines
    buffer: Mutex<LineBuffer>,

    /// Current capture state
    state: Mutex<CaptureState>,

    /// Session creation time
    started_at: SystemTime,
}

impl LogSession {
    /// Create a new session in the `Starting` state.
    pub fn new(
        id: impl Into<String>,
        platform: Platform,
        server_url: Option<String>,
        device_id: Option<String>,
        command_line: String,
        process: CaptureHandle,
        buffer_capacity: usize,
    ) -> Self {
        Self {
            id: id.into(),
            platform,
            server_url,
            device_id,
            command_line,
            process: Mutex::new(Some(process)),
            buffer: Mutex::new(LineBuffer::new(buffer_capacity)),
            state: Mutex::new(CaptureState::Starting),
            started_at: SystemTime::now(),
        }
    }

    /// Get the session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Get the automation server URL, if one was supplied.
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// Get the device the capture is bound to.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Get the printable capture command.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Get the session creation time.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Get the current capture state.
    pub fn state(&self) -> CaptureState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(_) => CaptureState::Failed,
        }
    }

    /// Whether the capture process is believed alive.
    pub fn is_streaming(&self) -> bool {
        self.state() == CaptureState::Streaming
    }

    /// Move to a new state, logging the transition.
    pub fn transition(&self, to: CaptureState) {
        if let Ok(mut state) = self.state.lock() {
            let from = *state;
            *state = to;
            info!("session state changed: id={}, {} -> {}", self.id, from, to);
        }
    }

    /// Split a raw stdout chunk into the buffer. Returns lines pushed.
    pub fn push_chunk(&self, chunk: &str) -> usize {
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.extend_from_chunk(chunk),
            Err(_) => 0,
        }
    }

    /// Number of buffered lines.
    pub fn buffered_lines(&self) -> usize {
        match self.buffer.lock() {
            Ok(buffer) => buffer.len(),
            Err(_) => 0,
        }
    }

    /// The last `n` buffered lines in original order, plus the total count.
    pub fn snapshot_tail(&self, n: usize) -> (Vec<String>, usize) {
        match self.buffer.lock() {
            Ok(buffer) => (buffer.snapshot_tail(n), buffer.len()),
            Err(_) => (Vec::new(), 0),
        }
    }

    /// Empty the buffer, returning the number of lines removed. Capture
    /// state is unchanged.
    pub fn clear_buffer(&self) -> usize {
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.clear(),
            Err(_) => 0,
        }
    }

    /// Whether the capture process has already terminated. True when the
    /// handle has been taken by an explicit stop.
    pub fn process_has_exited(&self) -> bool {
        match self.process.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(handle) => handle.has_exited(),
                None => true,
            },
            Err(_) => true,
        }
    }

    /// Take ownership of the process handle, leaving the session without
    /// one. Used by the explicit stop path.
    pub fn take_process(&self) -> Option<CaptureHandle> {
        match self.process.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        }
    }

    /// Human-readable description of the session: platform, device, command,
    /// state, and buffered line count.
    pub fn describe(&self) -> String {
        format!(
            "Session '{}' ({}) is {}.\nDevice: {}\nCommand: {}\nBuffered lines: {}",
            self.id,
            self.platform,
            self.state(),
            self.device_id.as_deref().unwrap_or("platform default"),
            self.command_line,
            self.buffered_lines(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobile_log_mcp_capture::CaptureCommand;

    fn test_session() -> LogSession {
        // adb is typically absent in test environments; the android command
        // goes through `sh`, so the spawn itself still succeeds.
        let command = CaptureCommand::android(None);
        let (handle, _rx) = CaptureHandle::spawn(&command).expect("spawn shell");
        LogSession::new(
            "s1",
            Platform::Android,
            Some("http://localhost:4723".to_string()),
            Some("emulator-5554".to_string()),
            command.display_line(),
            handle,
            100,
        )
    }

    #[tokio::test]
    async fn test_new_session_is_starting() {
        let session = test_session();
        assert_eq!(session.state(), CaptureState::Starting);
        assert!(!session.is_streaming());
        assert_eq!(session.buffered_lines(), 0);
    }

    #[tokio::test]
    async fn test_transitions() {
        let session = test_session();
        session.transition(CaptureState::Streaming);
        assert!(session.is_streaming());

        session.transition(CaptureState::Failed);
        assert_eq!(session.state(), CaptureState::Failed);
        assert!(!session.is_streaming());
    }

    #[tokio::test]
    async fn test_push_chunk_and_tail() {
        let session = test_session();
        session.push_chunk("a\nb\nc\n");

        let (lines, total) = session.snapshot_tail(2);
        assert_eq!(lines, vec!["b", "c"]);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_clear_keeps_state() {
        let session = test_session();
        session.transition(CaptureState::Streaming);
        session.push_chunk("a\nb\n");

        assert_eq!(session.clear_buffer(), 2);
        assert_eq!(session.buffered_lines(), 0);
        assert!(session.is_streaming());
    }

    #[tokio::test]
    async fn test_take_process_empties_slot() {
        let session = test_session();
        assert!(session.take_process().is_some());
        assert!(session.take_process().is_none());
        assert!(session.process_has_exited());
    }

    #[tokio::test]
    async fn test_describe_mentions_device_and_command() {
        let session = test_session();
        let description = session.describe();
        assert!(description.contains("emulator-5554"));
        assert!(description.contains("adb logcat -v time"));
        assert!(description.contains("starting"));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(CaptureState::Starting.name(), "starting");
        assert_eq!(CaptureState::Streaming.name(), "streaming");
        assert_eq!(CaptureState::Stopped.name(), "stopped");
        assert_eq!(CaptureState::Failed.name(), "failed");
    }
}
