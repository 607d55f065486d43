//! Agent configuration from TOML (`[agent]` section)

use quill_application::ExecutionParams;
use quill_domain::{
    ConfigIssue, ConfigIssueCode, ExecutionMode, MalformedCallPolicy, TransportMode,
};
use serde::{Deserialize, Serialize};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// transport = "line"            # "line" (in-process tools) or "mcp" (tool server)
/// max_iterations = 8            # tool rounds per turn; omit for no limit
/// malformed_calls = "drop"      # "drop" or "report"
/// execution = "sequential"      # "sequential" or "concurrent"
/// working_dir = "~/projects/app"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Tool transport, which also picks the call grammar
    pub transport: TransportMode,
    /// Tool rounds allowed per user turn (None = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    /// What to do with call lines that fail to parse
    pub malformed_calls: MalformedCallPolicy,
    /// How several calls from one completion are run
    pub execution: ExecutionMode,
    /// Base for relative tool paths (default: the current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl FileAgentConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_iterations(self.max_iterations)
            .with_execution_mode(self.execution)
            .with_malformed_calls(self.malformed_calls)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_iterations == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxIterations,
                "agent.max_iterations: 0 allows no tool calls at all; omit it for no limit",
            ));
        }

        if self.transport == TransportMode::Mcp && self.execution == ExecutionMode::Concurrent {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ConcurrentSingleCall,
                "agent.execution: 'concurrent' has no effect with transport 'mcp', \
                 which carries one call per completion",
            ));
        }

        issues
    }
}
