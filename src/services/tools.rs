use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::calc;
use super::{opt_i64, opt_str, opt_u64, Arguments, OperationError};
use crate::kernel::context::ServerContext;
use crate::kernel::telemetry::EntryHandle;
use crate::kernel::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Add,
    FailOnPurpose,
    Countdown,
    IncrementCounter,
    GetServerInfo,
    GetServerLogs,
    ExportLogs,
    HelloWorld,
    Calculate,
    GetSystemInfo,
    TestTool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    pub const ALL: [Tool; 11] = [
        Tool::Add,
        Tool::FailOnPurpose,
        Tool::Countdown,
        Tool::IncrementCounter,
        Tool::GetServerInfo,
        Tool::GetServerLogs,
        Tool::ExportLogs,
        Tool::HelloWorld,
        Tool::Calculate,
        Tool::GetSystemInfo,
        Tool::TestTool,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Add => "add",
            Tool::FailOnPurpose => "fail_on_purpose",
            Tool::Countdown => "countdown",
            Tool::IncrementCounter => "increment_counter",
            Tool::GetServerInfo => "get_server_info",
            Tool::GetServerLogs => "get_server_logs",
            Tool::ExportLogs => "export_logs",
            Tool::HelloWorld => "hello_world",
            Tool::Calculate => "calculate",
            Tool::GetSystemInfo => "get_system_info",
            Tool::TestTool => "test_tool",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::Add => "Add two numbers together",
            Tool::FailOnPurpose => "Always fails, to exercise error handling",
            Tool::Countdown => "Stream a countdown from N to 1",
            Tool::IncrementCounter => "Increment the server-side counter",
            Tool::GetServerInfo => "Get server information",
            Tool::GetServerLogs => "Display recent server operation logs in a formatted table",
            Tool::ExportLogs => "Export the in-memory operation log to a JSON file",
            Tool::HelloWorld => "Say hello",
            Tool::Calculate => "Evaluate an arithmetic expression (+, -, *, /, parentheses)",
            Tool::GetSystemInfo => "Get basic system information",
            Tool::TestTool => "Describe how a registered tool would be invoked",
        }
    }

    pub fn input_schema(&self) -> Value {
        let empty = json!({ "type": "object", "properties": {} });
        match self {
            Tool::Add => json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer", "description": "First number" },
                    "b": { "type": "integer", "description": "Second number" }
                },
                "required": ["a", "b"]
            }),
            Tool::FailOnPurpose => json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string", "default": DEFAULT_FAILURE }
                }
            }),
            Tool::Countdown => json!({
                "type": "object",
                "properties": {
                    "n": { "type": "integer", "minimum": 1, "default": DEFAULT_COUNTDOWN }
                },
                "required": ["n"]
            }),
            Tool::GetServerLogs => json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Number of recent logs to display (0 for all)"
                    }
                }
            }),
            Tool::ExportLogs => json!({
                "type": "object",
                "properties": {
                    "filename": { "type": "string", "description": "Destination path (optional)" }
                }
            }),
            Tool::HelloWorld => json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "default": "World" }
                }
            }),
            Tool::Calculate => json!({
                "type": "object",
                "properties": {
                    "expression": { "type": "string", "description": "e.g. '2+2', '(1 + 2) * 3'" }
                },
                "required": ["expression"]
            }),
            Tool::TestTool => json!({
                "type": "object",
                "properties": {
                    "tool_name": { "type": "string" },
                    "parameters": { "type": "object" }
                },
                "required": ["tool_name"]
            }),
            Tool::IncrementCounter | Tool::GetServerInfo | Tool::GetSystemInfo => empty,
        }
    }

    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

impl FromStr for Tool {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older clients use the dashed spelling.
        if s == "hello-world" {
            return Ok(Tool::HelloWorld);
        }
        Tool::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| OperationError::UnknownTool(s.to_string()))
    }
}

const DEFAULT_FAILURE: &str = "Intentional test error";
const DEFAULT_COUNTDOWN: u64 = 5;
const DEFAULT_LOG_LIMIT: usize = 20;

/// Run a tool and return its text output.
///
/// `handle` addresses the entry already recorded for this call; only streaming tools
/// use it.
pub async fn call(
    ctx: &Arc<ServerContext>,
    handle: EntryHandle,
    tool: Tool,
    args: &Arguments,
) -> Result<String, OperationError> {
    match tool {
        Tool::Add => {
            let a = opt_i64(args, "a")?.unwrap_or(0);
            let b = opt_i64(args, "b")?.unwrap_or(0);
            let sum = a
                .checked_add(b)
                .ok_or_else(|| OperationError::invalid("b", "sum overflows"))?;
            Ok(format!("Adding {} + {} = {}", a, b, sum))
        }
        Tool::FailOnPurpose => {
            let msg = opt_str(args, "message")?.unwrap_or(DEFAULT_FAILURE);
            Err(OperationError::Intentional(msg.to_string()))
        }
        Tool::Countdown => {
            let n = opt_u64(args, "n")?.unwrap_or(DEFAULT_COUNTDOWN);
            let max = ctx.config.server.max_countdown;
            if n == 0 || n > max {
                return Err(OperationError::invalid("n", format!("must be between 1 and {}", max)));
            }
            countdown(ctx, handle, n).await
        }
        Tool::IncrementCounter => Ok(format!(
            "Counter incremented to: {}",
            ctx.increment_counter()
        )),
        Tool::GetServerInfo => {
            let info = server_info(ctx);
            Ok(format!("Server Information:\n{}", serde_json::to_string_pretty(&info)?))
        }
        Tool::GetServerLogs => {
            // Zero means every retained entry.
            let limit = match opt_u64(args, "limit")? {
                None => DEFAULT_LOG_LIMIT,
                Some(0) => usize::MAX,
                Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            };
            let table = ctx.telemetry.render(Some(limit));
            let shown = limit.min(ctx.telemetry.len());
            Ok(format!(
                "## Server Logs\n\nShowing {} recent log entries\n\n```\n{}\n```",
                shown, table
            ))
        }
        Tool::ExportLogs => {
            let destination = opt_str(args, "filename")?.map(Path::new);
            let path = ctx.telemetry.export(destination)?;
            Ok(format!("Logs exported to {}", path.display()))
        }
        Tool::HelloWorld => {
            let name = opt_str(args, "name")?.unwrap_or("World");
            Ok(format!("Hello, {}!", name))
        }
        Tool::Calculate => {
            let expression = opt_str(args, "expression")?.unwrap_or("");
            let value = calc::evaluate(expression)?;
            Ok(format!("{} = {}", expression, calc::format_value(value)))
        }
        Tool::GetSystemInfo => {
            let cwd = std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            let info = json!({
                "os": std::env::consts::OS,
                "arch": std::env::consts::ARCH,
                "family": std::env::consts::FAMILY,
                "working_directory": cwd,
                "timestamp": time::iso(&time::now()),
            });
            Ok(format!(
                "## System Information\n\n```json\n{}\n```",
                serde_json::to_string_pretty(&info)?
            ))
        }
        Tool::TestTool => {
            let target = opt_str(args, "tool_name")?
                .ok_or_else(|| OperationError::invalid("tool_name", "is required"))?;
            let params = args.get("parameters").cloned().unwrap_or_else(|| json!({}));
            match target.parse::<Tool>() {
                Ok(t) => Ok(format!(
                    "Testing tool '{}' with parameters: {}",
                    t.name(),
                    serde_json::to_string_pretty(&params)?
                )),
                Err(_) => {
                    let available: Vec<&str> = Tool::ALL.iter().map(|t| t.name()).collect();
                    Ok(format!("Tool '{}' not found. Available tools: {:?}", target, available))
                }
            }
        }
    }
}

/// Counts down from `n`, recording one stream event per step from a spawned task.
async fn countdown(
    ctx: &Arc<ServerContext>,
    handle: EntryHandle,
    n: u64,
) -> Result<String, OperationError> {
    let ctx = Arc::clone(ctx);
    let delay = Duration::from_millis(ctx.config.server.countdown_delay_ms);

    let task = tokio::spawn(async move {
        let mut lines = Vec::with_capacity(n as usize + 1);
        for i in (1..=n).rev() {
            lines.push(format!("Countdown: {}", i));
            ctx.telemetry
                .record_stream_event(handle, json!({ "count": i, "remaining": i - 1 }));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        lines.push("Countdown complete!".to_string());
        lines
    });

    let lines = task.await.map_err(|e| OperationError::Task(e.to_string()))?;
    Ok(lines.join("\n"))
}

pub fn server_info(ctx: &ServerContext) -> Value {
    let uptime = ctx.uptime_secs();
    let store = ctx.telemetry.store();
    json!({
        "server_name": ctx.config.server.name,
        "version": ctx.config.server.version,
        "instance_id": ctx.instance_id,
        "started_at": time::iso(&ctx.started_at),
        "uptime_seconds": uptime,
        "uptime_human": time::human_duration(uptime),
        "features": {
            "tools": Tool::ALL.len(),
            "resources": super::resources::Resource::ALL.len(),
            "prompts": super::prompts::Prompt::ALL.len(),
            "streaming": true,
            "stateful": true,
            "error_handling": true,
        },
        "current_counter": ctx.counter(),
        "logs_in_memory": store.len(),
        "log_capacity": store.capacity(),
        "total_requests_recorded": store.total_recorded(),
    })
}
