use serde::{Deserialize, Serialize};

use crate::models::telegram::ChatRef;

/// Identifier field that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdParam {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipParams {
    pub token: Option<String>,
    pub user_id: Option<IdParam>,
    pub chat_id: Option<IdParam>,
}

#[derive(Debug, Clone)]
pub struct MembershipRequest {
    pub token: String,
    pub user_id: i64,
    pub chat: ChatRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    Unknown,
}

impl MemberStatus {
    pub fn from_status(status: &str) -> Self {
        match status {
            "creator" => MemberStatus::Creator,
            "administrator" => MemberStatus::Administrator,
            "member" => MemberStatus::Member,
            "restricted" => MemberStatus::Restricted,
            "left" => MemberStatus::Left,
            "kicked" => MemberStatus::Kicked,
            _ => MemberStatus::Unknown,
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            MemberStatus::Creator | MemberStatus::Administrator | MemberStatus::Member
        )
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, MemberStatus::Creator | MemberStatus::Administrator)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub username: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipResult {
    pub is_member: bool,
    pub is_admin: bool,
    pub user_status: String,
    pub chat: ChatSummary,
}
