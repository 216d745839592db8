//! MCP Tool Parameter Types
//!
//! This module defines the parameter types for all log capture tools,
//! with JSON schemas derived for the rmcp SDK.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mobile_log_mcp_core::Platform;

/// Parameters for start_log_broadcast
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StartLogBroadcastParams {
    /// Automation session the capture is keyed by
    pub session_id: String,

    /// Target platform (android or ios)
    pub platform: Platform,

    /// Automation server base URL; used to auto-resolve the device when no
    /// device_id is given
    #[serde(default)]
    pub server_url: Option<String>,

    /// Explicit device identifier (adb serial, simulator UUID, or UDID)
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Parameters for get_logs
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetLogsParams {
    /// Session to read from
    pub session_id: String,

    /// Maximum number of lines to return, newest last (default: 100)
    #[serde(default)]
    pub max_lines: Option<usize>,
}

/// Parameters for clear_log_buffer
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearLogBufferParams {
    /// Session whose buffer should be emptied
    pub session_id: String,
}

/// Parameters for stop_log_broadcast
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StopLogBroadcastParams {
    /// Session to stop
    pub session_id: String,

    /// Wait (bounded) for the capture process to confirm exit instead of
    /// fire-and-forget termination
    #[serde(default)]
    pub await_exit: bool,
}

/// Parameters for list_log_sessions
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListLogSessionsParams {}
