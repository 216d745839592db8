//! Mobile Log MCP Server Implementation
//!
//! This module implements the MCP server using rmcp 0.9's #[tool_router]
//! pattern. It routes MCP tool calls to the log capture library crates.

use std::sync::Arc;
use std::time::Duration;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError,
};

use tracing::{error, info, instrument, warn};

use mobile_log_mcp_core::ServerConfig;
use mobile_log_mcp_session::{
    CaptureState, DeviceResolver, LogCaptureLauncher, SessionRegistry, StartOutcome,
};

use crate::tools::*;

/// Mobile Log MCP Server
///
/// Owns the session registry and exposes capture lifecycle management via
/// MCP tools.
#[derive(Clone)]
pub struct MobileLogMcpServer {
    /// Session registry, the single source of truth for live captures
    registry: Arc<SessionRegistry>,
    /// Capture process launcher
    launcher: Arc<LogCaptureLauncher>,
    /// Best-effort device resolver
    resolver: Arc<DeviceResolver>,
    /// Server configuration
    config: ServerConfig,
    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MobileLogMcpServer {
    /// Create a new server with default configuration.
    pub fn new() -> mobile_log_mcp_core::Result<Self> {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new server with the given configuration.
    pub fn with_config(config: ServerConfig) -> mobile_log_mcp_core::Result<Self> {
        config.validate()?;
        let resolver = DeviceResolver::new(Duration::from_millis(
            config.resolver.request_timeout_ms,
        ))?;

        Ok(Self {
            registry: Arc::new(SessionRegistry::new()),
            launcher: Arc::new(LogCaptureLauncher::new(config.capture.clone())),
            resolver: Arc::new(resolver),
            config,
            tool_router: Self::tool_router(),
        })
    }

    fn text_result(text: String) -> CallToolResult {
        CallToolResult::success(vec![Content::text(text)])
    }

    /// Informational "not found" result - unknown sessions are never an
    /// MCP error.
    fn not_found(session_id: &str) -> CallToolResult {
        Self::text_result(format!(
            "No log session found for id '{session_id}'. Use list_log_sessions to see active sessions."
        ))
    }

    /// Start a log capture session
    #[tool(
        description = "Start capturing device logs for a mobile automation session (adb logcat on Android, log stream / syslog on iOS)"
    )]
    #[instrument(skip_all)]
    async fn start_log_broadcast(
        &self,
        Parameters(params): Parameters<StartLogBroadcastParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "starting log broadcast: session_id={}, platform={}, device={:?}",
            params.session_id, params.platform, params.device_id
        );

        // Auto-resolve the device from the session capabilities when the
        // caller gave us a server but no device.
        let mut device_id = params.device_id.clone();
        let mut resolved = false;
        if device_id.is_none() {
            if let Some(server_url) = &params.server_url {
                device_id = self.resolver.resolve(server_url, &params.session_id).await;
                resolved = device_id.is_some();
                if resolved {
                    info!(
                        "resolved device from session capabilities: session_id={}, device={:?}",
                        params.session_id, device_id
                    );
                }
            }
        }

        let outcome = self
            .launcher
            .start(
                &self.registry,
                &params.session_id,
                params.platform,
                params.server_url.clone(),
                device_id,
            )
            .await
            .map_err(|e| {
                error!("failed to start log broadcast: {}", e);
                McpError::new(ErrorCode(-32603), e.to_string(), None)
            })?;

        let text = match outcome {
            StartOutcome::Started(session) => {
                let mut text = format!("Log broadcast started.\n{}", session.describe());
                if resolved {
                    text.push_str("\nDevice was resolved from the session capabilities.");
                }
                text
            }
            StartOutcome::AlreadyStreaming(session) => format!(
                "Log broadcast already running; no new capture process was spawned.\n{}",
                session.describe()
            ),
        };

        Ok(Self::text_result(text))
    }

    /// Read buffered log lines
    #[tool(description = "Get the most recent buffered log lines for a session")]
    #[instrument(skip_all)]
    async fn get_logs(
        &self,
        Parameters(params): Parameters<GetLogsParams>,
    ) -> Result<CallToolResult, McpError> {
        let Some(session) = self.registry.get(&params.session_id).await else {
            return Ok(Self::not_found(&params.session_id));
        };

        let max_lines = params
            .max_lines
            .unwrap_or(self.config.capture.default_tail_lines);
        let (lines, total) = session.snapshot_tail(max_lines);
        let shown = lines.len();

        let text = if total == 0 {
            format!(
                "No log lines buffered for session '{}' (state: {}).",
                params.session_id,
                session.state()
            )
        } else {
            let mut header = format!(
                "Showing {shown} of {total} buffered line(s) for session '{}'",
                params.session_id
            );
            if total > shown {
                header.push_str(" (truncated to the newest)");
            }
            format!("{header}:\n{}", lines.join("\n"))
        };

        Ok(Self::text_result(text))
    }

    /// Clear a session's log buffer
    #[tool(description = "Clear the buffered log lines for a session without stopping the capture")]
    #[instrument(skip_all)]
    async fn clear_log_buffer(
        &self,
        Parameters(params): Parameters<ClearLogBufferParams>,
    ) -> Result<CallToolResult, McpError> {
        let Some(session) = self.registry.get(&params.session_id).await else {
            return Ok(Self::not_found(&params.session_id));
        };

        let cleared = session.clear_buffer();
        info!(
            "cleared log buffer: session_id={}, lines={}",
            params.session_id, cleared
        );

        Ok(Self::text_result(format!(
            "Cleared {cleared} buffered line(s) for session '{}'. Capture state is unchanged ({}).",
            params.session_id,
            session.state()
        )))
    }

    /// Stop a log capture session
    #[tool(
        description = "Stop a log capture session: terminate its capture process and remove it from the registry"
    )]
    #[instrument(skip_all)]
    async fn stop_log_broadcast(
        &self,
        Parameters(params): Parameters<StopLogBroadcastParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("stopping log broadcast: session_id={}", params.session_id);

        // Removal is unconditional; signal delivery is best effort.
        let Some(session) = self.registry.remove(&params.session_id).await else {
            return Ok(Self::text_result(format!(
                "No log session found for id '{}'; nothing to stop.",
                params.session_id
            )));
        };

        let buffered = session.buffered_lines();
        let mut notes = Vec::new();

        if let Some(handle) = session.take_process() {
            if let Err(e) = handle.signal_term() {
                warn!(
                    "termination signal failed: session_id={}, error={}",
                    params.session_id, e
                );
                notes.push(format!("Termination signal could not be delivered: {e}."));
            } else if params.await_exit {
                let wait = Duration::from_millis(self.config.capture.stop_wait_ms);
                if handle.wait_exited(wait).await {
                    notes.push("Capture process exit confirmed.".to_string());
                } else {
                    notes.push(format!(
                        "Capture process did not confirm exit within {}ms.",
                        self.config.capture.stop_wait_ms
                    ));
                }
            }
        }
        session.transition(CaptureState::Stopped);

        let mut text = format!(
            "Stopped log broadcast for session '{}'. {buffered} line(s) were buffered.",
            params.session_id
        );
        for note in notes {
            text.push('\n');
            text.push_str(&note);
        }

        Ok(Self::text_result(text))
    }

    /// List all log capture sessions
    #[tool(description = "List all log capture sessions with their state and buffered line counts")]
    #[instrument(skip_all)]
    async fn list_log_sessions(
        &self,
        Parameters(_params): Parameters<ListLogSessionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut sessions = self.registry.list().await;
        sessions.sort_by(|a, b| a.id().cmp(b.id()));

        let text = if sessions.is_empty() {
            "No active log sessions.".to_string()
        } else {
            let mut text = format!("{} log session(s):", sessions.len());
            for session in &sessions {
                text.push_str(&format!(
                    "\n- '{}' ({}) state={} device={} server={} buffered={}",
                    session.id(),
                    session.platform(),
                    session.state(),
                    session.device_id().unwrap_or("default"),
                    session.server_url().unwrap_or("-"),
                    session.buffered_lines(),
                ));
            }
            text
        };

        Ok(Self::text_result(text))
    }
}

// Implement the ServerHandler trait to define server capabilities
#[tool_handler]
impl rmcp::ServerHandler for MobileLogMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Mobile Log MCP Server - capture device logs for mobile automation sessions. \
                 Use start_log_broadcast to begin capturing (adb logcat on Android, \
                 log stream / syslog on iOS), get_logs to read the buffered tail, \
                 clear_log_buffer to reset it, and stop_log_broadcast when done."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
