use crate::{
    clients::telegram::TelegramClient,
    error::MembershipError,
    models::membership::{ChatSummary, MemberStatus, MembershipRequest, MembershipResult},
};

/// Resolves the chat, then the user's status in it.
pub async fn check_membership(
    client: &TelegramClient,
    request: &MembershipRequest,
) -> Result<MembershipResult, MembershipError> {
    let chat = client
        .get_chat(&request.chat)
        .await
        .map_err(MembershipError::LookupFailed)?;

    let member = client
        .get_chat_member(chat.id, request.user_id)
        .await
        .map_err(MembershipError::LookupFailed)?;

    let status = MemberStatus::from_status(&member.status);

    Ok(MembershipResult {
        is_member: status.is_member(),
        is_admin: status.is_admin(),
        user_status: member.status,
        chat: ChatSummary {
            username: request.chat.display_name(),
            title: chat.title,
            kind: chat.kind,
        },
    })
}
