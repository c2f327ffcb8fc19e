use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use sandwich_core::{AppError, AppResult, UserId};
use sandwich_domain::{EffectiveUser, MessageChannel, Permission};

use crate::authorization_service::require_permission;

/// Longest accepted message body.
pub const MESSAGE_MAX_LENGTH: usize = 4000;

/// Committee chat message projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Stable message identifier.
    pub message_id: Uuid,
    /// Channel the message was posted to.
    pub channel: MessageChannel,
    /// Posting user.
    pub sender_id: UserId,
    /// Display name captured at posting time.
    pub sender_name: String,
    /// Message body.
    pub body: String,
    /// Posting timestamp in RFC3339.
    pub created_at: String,
}

/// Repository port for chat message rows.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Lists messages in a channel, oldest first, bounded by `limit`.
    async fn list_channel(
        &self,
        channel: MessageChannel,
        limit: usize,
    ) -> AppResult<Vec<Message>>;

    /// Returns one message, if it exists.
    async fn find(&self, message_id: Uuid) -> AppResult<Option<Message>>;

    /// Appends a message and returns the stored row.
    async fn create(
        &self,
        channel: MessageChannel,
        sender_id: UserId,
        sender_name: &str,
        body: &str,
    ) -> AppResult<Message>;

    /// Deletes a message; `NotFound` when it does not exist.
    async fn delete(&self, message_id: Uuid) -> AppResult<()>;
}

/// Application service for committee chat.
#[derive(Clone)]
pub struct MessageService {
    repository: Arc<dyn MessageRepository>,
}

impl MessageService {
    /// Creates a new message service.
    #[must_use]
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// Lists a channel's recent messages.
    pub async fn list_channel(
        &self,
        actor: &EffectiveUser,
        channel: MessageChannel,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        require_permission(actor, Permission::ViewMessages)?;
        self.repository.list_channel(channel, limit.clamp(1, 500)).await
    }

    /// Posts a message as the acting user.
    pub async fn post_message(
        &self,
        actor: &EffectiveUser,
        channel: MessageChannel,
        sender_name: &str,
        body: &str,
    ) -> AppResult<Message> {
        require_permission(actor, Permission::CreateMessages)?;

        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::Validation(
                "message body must not be empty".to_owned(),
            ));
        }
        if body.chars().count() > MESSAGE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "message body must not exceed {MESSAGE_MAX_LENGTH} characters"
            )));
        }

        self.repository
            .create(channel, actor.user_id, sender_name, body)
            .await
    }

    /// Deletes a message.
    ///
    /// Authors may remove their own messages; removing someone else's
    /// requires the moderation permission.
    pub async fn delete_message(&self, actor: &EffectiveUser, message_id: Uuid) -> AppResult<()> {
        require_permission(actor, Permission::ViewMessages)?;

        let message = self
            .repository
            .find(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message '{message_id}' was not found")))?;

        if message.sender_id != actor.user_id {
            require_permission(actor, Permission::ModerateMessages)?;
        }

        self.repository.delete(message_id).await
    }
}
