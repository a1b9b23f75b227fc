use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;

use super::context::ServerContext;
use super::telemetry::EntryHandle;
use crate::services::prompts::{self, Prompt, PromptInfo, PromptResult};
use crate::services::resources::{self, Resource, ResourceInfo};
use crate::services::tools::{self, Tool, ToolInfo};
use crate::services::{Arguments, OperationError};

/// The `request_type` recorded for each kind of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Tools,
    ToolCall,
    Resources,
    ResourceRead,
    Prompts,
    PromptGet,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Tools => "TOOLS",
            RequestKind::ToolCall => "TOOL_CALL",
            RequestKind::Resources => "RESOURCES",
            RequestKind::ResourceRead => "RESOURCE_READ",
            RequestKind::Prompts => "PROMPTS",
            RequestKind::PromptGet => "PROMPT_GET",
        }
    }
}

/// One inbound request, e.g. `{"method": "tools/call", "params": {"name": "add", ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    #[serde(rename = "tools/list")]
    ListTools,
    #[serde(rename = "tools/call")]
    CallTool {
        name: String,
        #[serde(default)]
        arguments: Arguments,
    },
    #[serde(rename = "resources/list")]
    ListResources,
    #[serde(rename = "resources/read")]
    ReadResource { uri: String },
    #[serde(rename = "prompts/list")]
    ListPrompts,
    #[serde(rename = "prompts/get")]
    GetPrompt {
        name: String,
        #[serde(default)]
        arguments: Arguments,
    },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::ListTools => RequestKind::Tools,
            Request::CallTool { .. } => RequestKind::ToolCall,
            Request::ListResources => RequestKind::Resources,
            Request::ReadResource { .. } => RequestKind::ResourceRead,
            Request::ListPrompts => RequestKind::Prompts,
            Request::GetPrompt { .. } => RequestKind::PromptGet,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Request::ListTools => "list_tools",
            Request::CallTool { .. } => "call_tool",
            Request::ListResources => "list_resources",
            Request::ReadResource { .. } => "read_resource",
            Request::ListPrompts => "list_prompts",
            Request::GetPrompt { .. } => "get_prompt",
        }
    }

    /// The tool, resource or prompt being addressed, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Request::CallTool { name, .. } | Request::GetPrompt { name, .. } => Some(name),
            Request::ReadResource { uri } => Some(uri),
            _ => None,
        }
    }

    pub fn arguments(&self) -> Arguments {
        match self {
            Request::CallTool { arguments, .. } | Request::GetPrompt { arguments, .. } => {
                arguments.clone()
            }
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Tools { tools: Vec<ToolInfo> },
    Resources { resources: Vec<ResourceInfo> },
    Prompts { prompts: Vec<PromptInfo> },
    Text { text: String, is_error: bool },
    Resource { uri: String, text: String },
    Prompt(PromptResult),
}

impl Reply {
    fn error(text: String) -> Self {
        Reply::Text { text, is_error: true }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Text { is_error: true, .. })
    }
}

/// Record, execute and answer one request.
///
/// Every request gets exactly one entry; handler failures become an error string on
/// that entry and an error reply, never a panic.
pub async fn dispatch(ctx: &Arc<ServerContext>, request: Request) -> Reply {
    let started = Instant::now();
    let payload = serde_json::to_value(&request).unwrap_or(Value::Null);
    let handle = ctx.telemetry.record_request(
        request.kind().as_str(),
        request.operation(),
        request.target(),
        request.arguments(),
        payload,
    );

    let outcome = execute(ctx, handle, &request).await;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok((reply, summary)) => {
            ctx.telemetry.record_response(handle, Some(summary), None, Some(latency_ms));
            reply
        }
        Err(e) => {
            let message = e.to_string();
            ctx.telemetry.record_response(handle, None, Some(message.clone()), Some(latency_ms));
            match &request {
                Request::ReadResource { uri } => Reply::error(format!(
                    "Error reading resource '{}': {}",
                    uri, message
                )),
                _ => Reply::error(format!("Error: {}", message)),
            }
        }
    }
}

async fn execute(
    ctx: &Arc<ServerContext>,
    handle: EntryHandle,
    request: &Request,
) -> Result<(Reply, Value), OperationError> {
    match request {
        Request::ListTools => {
            let tools: Vec<ToolInfo> = Tool::ALL.iter().map(Tool::info).collect();
            let names: Vec<&str> = tools.iter().map(|t| t.name).collect();
            Ok((Reply::Tools { tools }, json!({ "tools": names })))
        }
        Request::CallTool { name, arguments } => {
            let tool: Tool = name.parse()?;
            let text = tools::call(ctx, handle, tool, arguments).await?;
            Ok((Reply::Text { text, is_error: false }, json!({ "result": "success" })))
        }
        Request::ListResources => {
            let resources: Vec<ResourceInfo> = Resource::ALL.iter().map(Resource::info).collect();
            let uris: Vec<&str> = resources.iter().map(|r| r.uri).collect();
            Ok((Reply::Resources { resources }, json!({ "resources": uris })))
        }
        Request::ReadResource { uri } => {
            let resource: Resource = uri.parse()?;
            let text = resources::read(ctx, resource)?;
            let summary = json!({ "content_length": text.len() });
            Ok((Reply::Resource { uri: uri.clone(), text }, summary))
        }
        Request::ListPrompts => {
            let prompts: Vec<PromptInfo> = Prompt::ALL.iter().map(Prompt::info).collect();
            let names: Vec<&str> = prompts.iter().map(|p| p.name).collect();
            Ok((Reply::Prompts { prompts }, json!({ "prompts": names })))
        }
        Request::GetPrompt { name, arguments } => {
            let prompt: Prompt = name.parse()?;
            let result = prompts::get(prompt, arguments)?;
            Ok((Reply::Prompt(result), json!({ "prompt_generated": true })))
        }
    }
}
