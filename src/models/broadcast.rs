use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::models::recipient::RecipientId;

/// Markup mode the payload is rendered and sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ParseMode {
    #[default]
    #[serde(rename = "HTML")]
    Html,
    MarkdownV2,
    Markdown,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Markdown => "Markdown",
        }
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ParseMode::Html),
            "markdownv2" => Ok(ParseMode::MarkdownV2),
            "markdown" => Ok(ParseMode::Markdown),
            other => Err(format!("Unsupported parse_mode: {}", other)),
        }
    }
}

impl Display for ParseMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw broadcast input, as received on the query string or JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastParams {
    pub token: Option<String>,
    pub message: Option<String>,
    pub parse_mode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    pub token: String,
    pub message: String,
    pub parse_mode: ParseMode,
}

/// The formatted text sent to every recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub text: String,
    pub parse_mode: ParseMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered,
    Failed { reason: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub recipient: RecipientId,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRecipient {
    #[serde(rename = "userId")]
    pub user_id: RecipientId,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub total_users: usize,
    pub successful: usize,
    pub failed: usize,
    pub parse_mode: ParseMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_users: Option<Vec<FailedRecipient>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
