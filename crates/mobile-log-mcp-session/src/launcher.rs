//! Capture start orchestration.
//!
//! Selects the platform-specific capture command, spawns it, wires its
//! events into the session, and performs the settle-delay startup check
//! before the session is registered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use mobile_log_mcp_capture::{split_chunk, CaptureCommand, CaptureEvent, CaptureHandle};
use mobile_log_mcp_core::{
    CaptureSettings, DeviceClassifier, Error, HeuristicClassifier, Platform, Result,
};

use crate::registry::SessionRegistry;
use crate::session::{CaptureState, LogSession};

/// Result of a start request.
#[derive(Debug)]
pub enum StartOutcome {
    /// A new capture process was spawned and registered.
    Started(Arc<LogSession>),
    /// A streaming session already existed for the id; no second process
    /// was spawned.
    AlreadyStreaming(Arc<LogSession>),
}

impl StartOutcome {
    /// The session this outcome refers to.
    pub fn session(&self) -> &Arc<LogSession> {
        match self {
            StartOutcome::Started(session) | StartOutcome::AlreadyStreaming(session) => session,
        }
    }
}

/// Spawns platform-specific capture processes and registers the resulting
/// sessions.
pub struct LogCaptureLauncher {
    settings: CaptureSettings,
    classifier: Arc<dyn DeviceClassifier>,
}

impl LogCaptureLauncher {
    /// Create a launcher using the default heuristic device classifier.
    pub fn new(settings: CaptureSettings) -> Self {
        Self::with_classifier(settings, Arc::new(HeuristicClassifier))
    }

    /// Create a launcher with a custom device classifier.
    pub fn with_classifier(
        settings: CaptureSettings,
        classifier: Arc<dyn DeviceClassifier>,
    ) -> Self {
        Self {
            settings,
            classifier,
        }
    }

    /// Start a capture session, or return the existing one if it is still
    /// streaming.
    ///
    /// A freshly spawned process gets the settle delay to prove it can run
    /// at all; if it already exited by then, the start fails with a
    /// remediation hint and nothing is registered. Slow or silent failures
    /// past the settle window are not detected here - they surface as the
    /// `Failed` state on a later query.
    pub async fn start(
        &self,
        registry: &SessionRegistry,
        id: &str,
        platform: Platform,
        server_url: Option<String>,
        device_id: Option<String>,
    ) -> Result<StartOutcome> {
        if let Some(existing) = registry.get(id).await {
            if existing.is_streaming() {
                info!("start requested for already-streaming session: id={}", id);
                return Ok(StartOutcome::AlreadyStreaming(existing));
            }
        }

        let command =
            CaptureCommand::for_platform(platform, device_id.as_deref(), self.classifier.as_ref());
        info!(
            "starting log capture: id={}, platform={}, command=`{}`",
            id,
            platform,
            command.display_line()
        );

        let (handle, events) = CaptureHandle::spawn(&command)
            .map_err(|e| Error::StartupFailure(startup_remediation(&command, Some(&e.to_string()))))?;

        let session = Arc::new(LogSession::new(
            id,
            platform,
            server_url,
            device_id,
            command.display_line(),
            handle,
            self.settings.buffer_capacity,
        ));
        spawn_event_pump(Arc::clone(&session), events);

        // Settle window: catches tools that are missing, devices that are
        // not connected, simulators that are not booted.
        tokio::time::sleep(Duration::from_millis(self.settings.settle_delay_ms)).await;
        if session.process_has_exited() {
            session.transition(CaptureState::Failed);
            return Err(Error::StartupFailure(startup_remediation(&command, None)));
        }

        session.transition(CaptureState::Streaming);
        registry.insert(Arc::clone(&session)).await;
        Ok(StartOutcome::Started(session))
    }
}

/// Consume the capture process's events: stdout into the buffer, stderr to
/// diagnostics, exit into the state machine. One pump per session keeps the
/// session single-writer.
fn spawn_event_pump(session: Arc<LogSession>, mut events: mpsc::UnboundedReceiver<CaptureEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CaptureEvent::Stdout(chunk) => {
                    session.push_chunk(&chunk);
                }
                CaptureEvent::Stderr(chunk) => forward_stderr(&session, &chunk),
                CaptureEvent::Exited(code) => {
                    if session.state() != CaptureState::Stopped {
                        warn!(
                            "capture process exited: session={}, code={:?}",
                            session.id(),
                            code
                        );
                        session.transition(CaptureState::Failed);
                    }
                }
            }
        }
    });
}

fn forward_stderr(session: &LogSession, chunk: &str) {
    for line in split_chunk(chunk) {
        match session.platform() {
            Platform::Android => {
                warn!("capture stderr: session={}, {}", session.id(), line);
            }
            // The iOS log stream is chatty on stderr; only surface real errors.
            Platform::Ios => {
                if line.contains("error") {
                    warn!("capture stderr: session={}, {}", session.id(), line);
                }
            }
        }
    }
}

/// Platform- and tool-specific remediation hint for a capture process that
/// could not be spawned (`detail` carries the OS error) or died inside the
/// settle window.
fn startup_remediation(command: &CaptureCommand, detail: Option<&str>) -> String {
    let hint = match command.program() {
        "adb" => {
            "Ensure Android platform-tools are installed, `adb` is on PATH, \
             and the device is connected (check `adb devices`)"
        }
        "xcrun" => {
            "Ensure Xcode command line tools are installed and the target \
             simulator is booted (check `xcrun simctl list devices`)"
        }
        _ => "Ensure libimobiledevice is installed and the device is connected over USB",
    };

    match detail {
        Some(detail) => format!(
            "`{}` could not be spawned ({detail}). {hint}.",
            command.display_line()
        ),
        None => format!(
            "`{}` exited during startup. {hint}.",
            command.display_line()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_streaming_session(id: &str) -> Arc<LogSession> {
        let command = CaptureCommand::android(None);
        let (handle, _rx) = CaptureHandle::spawn(&command).expect("spawn shell");
        let session = Arc::new(LogSession::new(
            id,
            Platform::Android,
            None,
            None,
            command.display_line(),
            handle,
            100,
        ));
        session.transition(CaptureState::Streaming);
        session
    }

    #[tokio::test]
    async fn test_duplicate_start_returns_existing_session() {
        let registry = SessionRegistry::new();
        let existing = make_streaming_session("s1");
        registry.insert(Arc::clone(&existing)).await;

        let launcher = LogCaptureLauncher::new(CaptureSettings::default());
        let outcome = launcher
            .start(&registry, "s1", Platform::Android, None, None)
            .await
            .expect("duplicate start short-circuits");

        match outcome {
            StartOutcome::AlreadyStreaming(session) => {
                assert!(Arc::ptr_eq(&session, &existing));
            }
            StartOutcome::Started(_) => panic!("expected duplicate guard to trigger"),
        }
        assert_eq!(registry.len().await, 1);
    }

    #[test]
    fn test_remediation_for_adb() {
        let command = CaptureCommand::android(Some("emulator-5554"));
        let message = startup_remediation(&command, None);
        assert!(message.contains("adb -s emulator-5554 logcat -v time"));
        assert!(message.contains("adb devices"));
    }

    #[test]
    fn test_remediation_for_simulator() {
        let command = CaptureCommand::ios(None, &HeuristicClassifier);
        let message = startup_remediation(&command, None);
        assert!(message.contains("simctl list devices"));
    }

    #[test]
    fn test_remediation_for_physical_ios_device() {
        let command = CaptureCommand::ios(Some("a1b2c3d4e5f6"), &HeuristicClassifier);
        let message = startup_remediation(&command, Some("No such file or directory"));
        assert!(message.contains("libimobiledevice"));
        assert!(message.contains("No such file or directory"));
    }
}
