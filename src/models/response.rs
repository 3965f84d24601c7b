use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const BROADCAST_API_VERSION: &str = "v1.0.0";
pub const MEMBERSHIP_API_VERSION: &str = "1.3.0";
pub const DEVELOPER_CREDIT: &str = "@InayatGaming on Telegram";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Attribution block attached to broadcast responses.
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub developer: &'static str,
    pub youtube: &'static str,
    pub twitter: &'static str,
    pub github: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            developer: DEVELOPER_CREDIT,
            youtube: "@InayatGaming",
            twitter: "@inayatGaming",
            github: "@InayatGaming",
            version: BROADCAST_API_VERSION,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Attribution block attached to membership responses.
#[derive(Debug, Clone, Serialize)]
pub struct SocialLinks {
    pub developer: &'static str,
    pub youtube: &'static str,
    pub twitter: &'static str,
    pub github: &'static str,
    pub bsky: &'static str,
}

pub const SOCIAL_LINKS: SocialLinks = SocialLinks {
    developer: "@Kaiiddo on Telegram",
    youtube: "@Kaiiddo",
    twitter: "@HelloKaiiddo",
    github: "ProKaiiddo",
    bsky: "kaiiddo.bsky.social",
};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,

    #[serde(flatten)]
    pub body: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<SocialLinks>,
}

impl<T> ApiResponse<T> {
    pub fn success(body: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            body,
            meta: None,
            social: None,
        }
    }

    pub fn error(body: T) -> Self {
        Self {
            status: ResponseStatus::Error,
            body,
            meta: None,
            social: None,
        }
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = Some(Meta::now());
        self
    }

    pub fn with_social(mut self) -> Self {
        self.social = Some(SOCIAL_LINKS);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_fields_are_flattened_next_to_status() {
        let response = ApiResponse::error(ErrorBody {
            code: Some("INVALID_JSON"),
            message: "Invalid JSON body.".to_string(),
            error: None,
        })
        .with_social();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "INVALID_JSON");
        assert_eq!(value["social"]["bsky"], "kaiiddo.bsky.social");
        assert!(value.get("meta").is_none());
        assert!(value.get("error").is_none());
    }
}
