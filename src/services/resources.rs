use serde::Serialize;
use std::str::FromStr;

use super::tools;
use super::OperationError;
use crate::kernel::context::ServerContext;
use crate::kernel::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    CurrentTime,
    BigText,
    TinyPng,
    ServerInfo,
    Logs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceInfo {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
}

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod \
tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint \
occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.";

const BIG_TEXT_TARGET: usize = 10_000;

// 8x8 red square.
const TINY_PNG_BASE64: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAAAgAAAAICAYAAADED76LAAAABHNCSVQICAgIfAhkiAAAAAlwSFlzAAAA",
    "dgAAAHYBTnsmCAAAABl0RVh0U29mdHdhcmUAd3d3Lmlua3NjYXBlLm9yZ5vuPBoAAABESURBVBiVY/z/",
    "/z8DAwMDw3+cYP///wwMDAyM/3GC////MzAwMDD+xwn+//8PxijO+Y8D/P//nwEbwKmAEVcBTgVYFQAA",
    "AAD//2JgYGAAAAAA//9iYGBgAAAAAP//YmBgYAAAAAD//2JgYGAAAAAA//9iYGBgAAAAAP//YmBgYAAA",
    "AAD//w==",
);

const SERVER_LOG_ROWS: usize = 50;

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::CurrentTime,
        Resource::BigText,
        Resource::TinyPng,
        Resource::ServerInfo,
        Resource::Logs,
    ];

    pub fn uri(&self) -> &'static str {
        match self {
            Resource::CurrentTime => "time://current",
            Resource::BigText => "data://big_text",
            Resource::TinyPng => "image://tiny_png_base64",
            Resource::ServerInfo => "demo://server-info",
            Resource::Logs => "demo://logs",
        }
    }

    pub fn info(&self) -> ResourceInfo {
        let (name, description, mime_type) = match self {
            Resource::CurrentTime => (
                "Current Server Time",
                "Returns the current server time in ISO format",
                "text/plain",
            ),
            Resource::BigText => (
                "Large Text Data",
                "Returns a large text string for context window testing (10KB+)",
                "text/plain",
            ),
            Resource::TinyPng => (
                "Tiny PNG Image (Base64)",
                "Returns a small PNG image encoded as base64",
                "image/png",
            ),
            Resource::ServerInfo => (
                "Server Information",
                "Basic information about this server",
                "application/json",
            ),
            Resource::Logs => ("Server Logs", "Recent server operation logs", "text/plain"),
        };
        ResourceInfo {
            uri: self.uri(),
            name,
            description,
            mime_type,
        }
    }
}

impl FromStr for Resource {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.uri() == s)
            .ok_or_else(|| OperationError::UnknownResource(s.to_string()))
    }
}

pub fn read(ctx: &ServerContext, resource: Resource) -> Result<String, OperationError> {
    match resource {
        Resource::CurrentTime => Ok(time::iso(&time::now())),
        Resource::BigText => Ok(big_text()),
        Resource::TinyPng => Ok(format!("data:image/png;base64,{}", TINY_PNG_BASE64)),
        Resource::ServerInfo => Ok(serde_json::to_string_pretty(&tools::server_info(ctx))?),
        Resource::Logs => Ok(ctx.telemetry.render(Some(SERVER_LOG_ROWS))),
    }
}

fn big_text() -> String {
    let repetitions = BIG_TEXT_TARGET / LOREM.len() + 1;
    let mut content = String::with_capacity((LOREM.len() + 2) * repetitions + 256);
    content.push_str("=== LARGE TEXT RESOURCE FOR CONTEXT TESTING ===\n");
    content.push_str(&format!("Generated at: {}\n", time::iso(&time::now())));
    content.push_str(&format!("Size: ~{} characters\n", LOREM.len() * repetitions));
    content.push_str(&"=".repeat(50));
    content.push_str("\n\n");
    for _ in 0..repetitions {
        content.push_str(LOREM);
        content.push_str("\n\n");
    }
    content.push_str("=== END OF LARGE TEXT RESOURCE ===");
    content
}
