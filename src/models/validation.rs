use crate::{
    broadcast::formatter::{FOOTER_SEPARATOR, footer_text},
    error::{BroadcastError, MembershipError},
    models::{
        broadcast::{BroadcastParams, BroadcastRequest, ParseMode},
        membership::{IdParam, MembershipParams, MembershipRequest},
        telegram::ChatRef,
    },
};

/// Bot API limit on the text of a single message.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Longest body that still fits the Bot API limit once the footer is appended.
/// Footer markup is not counted since Telegram measures the parsed text.
pub fn max_body_length() -> usize {
    MAX_MESSAGE_LENGTH
        .saturating_sub(FOOTER_SEPARATOR.chars().count() + footer_text().chars().count())
}

pub fn validate_broadcast(params: BroadcastParams) -> Result<BroadcastRequest, BroadcastError> {
    let token = non_empty(params.token).ok_or(BroadcastError::MissingParameters)?;
    let message = params
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or(BroadcastError::MissingParameters)?;

    let length = message.chars().count();
    let max = max_body_length();
    if length > max {
        return Err(BroadcastError::MessageTooLong { length, max });
    }

    let parse_mode = match non_empty(params.parse_mode) {
        Some(raw) => raw
            .parse::<ParseMode>()
            .map_err(BroadcastError::InvalidParseMode)?,
        None => ParseMode::default(),
    };

    Ok(BroadcastRequest {
        token,
        message,
        parse_mode,
    })
}

pub fn validate_membership(params: MembershipParams) -> Result<MembershipRequest, MembershipError> {
    let token = non_empty(params.token).ok_or(MembershipError::MissingParameters)?;
    let user_id = params
        .user_id
        .as_ref()
        .and_then(parse_user_id)
        .ok_or(MembershipError::MissingParameters)?;
    let chat = params
        .chat_id
        .as_ref()
        .and_then(parse_chat_ref)
        .ok_or(MembershipError::MissingParameters)?;

    Ok(MembershipRequest {
        token,
        user_id,
        chat,
    })
}

/// Trims the input and strips one leading `@`.
pub fn clean_chat_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_prefix('@').unwrap_or(trimmed);

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn parse_user_id(param: &IdParam) -> Option<i64> {
    let id = match param {
        IdParam::Number(id) => Some(*id),
        IdParam::Text(text) => text.trim().parse::<i64>().ok(),
    };
    id.filter(|id| *id != 0)
}

fn parse_chat_ref(param: &IdParam) -> Option<ChatRef> {
    match param {
        IdParam::Number(id) => Some(ChatRef::Id(*id)),
        IdParam::Text(text) => {
            let cleaned = clean_chat_identifier(text)?;
            match cleaned.parse::<i64>() {
                Ok(id) => Some(ChatRef::Id(id)),
                Err(_) => Some(ChatRef::Username(format!("@{}", cleaned))),
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
