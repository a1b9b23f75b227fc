use serde::Serialize;
use std::str::FromStr;

use super::{opt_str, Arguments, OperationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    Greet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptResult {
    pub description: String,
    pub messages: Vec<PromptMessage>,
}

impl Prompt {
    pub const ALL: [Prompt; 1] = [Prompt::Greet];

    pub fn name(&self) -> &'static str {
        match self {
            Prompt::Greet => "prompt_greet",
        }
    }

    pub fn info(&self) -> PromptInfo {
        match self {
            Prompt::Greet => PromptInfo {
                name: self.name(),
                description: "Generate a friendly greeting prompt for a given name",
                arguments: vec![PromptArgument {
                    name: "name",
                    description: "The name of the person to greet",
                    required: true,
                }],
            },
        }
    }
}

impl FromStr for Prompt {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prompt::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| OperationError::UnknownPrompt(s.to_string()))
    }
}

pub fn get(prompt: Prompt, args: &Arguments) -> Result<PromptResult, OperationError> {
    match prompt {
        Prompt::Greet => {
            let target = opt_str(args, "name")?.unwrap_or("World");
            Ok(PromptResult {
                description: format!("Greeting prompt for {}", target),
                messages: vec![PromptMessage {
                    role: "user",
                    text: format!("Write a friendly greeting for {}.", target),
                }],
            })
        }
    }
}
