use super::{FcmTokenId, NotificationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "users", rename_all = "snake_case")]
pub enum Audience {
    /// Every active user.
    AllUsers,
    Users(Vec<UserId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Push,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Draft,
    Queued,
    Sent,
    Failed,
}

/// A broadcast written by an admin and delivered by the notification job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub channels: Vec<Channel>,
    pub status: NotificationStatus,
    pub delivered: u32,
    pub failed: u32,
    pub pruned_tokens: u32,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NotificationCreate {
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub channels: Vec<Channel>,
}

/// Outcome of a fan-out, per recipient channel attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: u32,
    pub failed: u32,
    pub pruned: u32,
}

impl DeliveryReport {
    pub fn merge(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.pruned += other.pruned;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

/// A device push token. One row per token; the token is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcmToken {
    pub id: FcmTokenId,
    pub user_id: UserId,
    pub token: String,
    pub device_id: Option<String>,
    pub platform: Platform,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FcmTokenCreate {
    pub user_id: UserId,
    pub token: String,
    pub device_id: Option<String>,
    pub platform: Platform,
    pub at: DateTime<Utc>,
}

/// Moves an existing token to its current owner and device.
#[derive(Debug, Clone)]
pub struct FcmTokenUpdate {
    pub user_id: UserId,
    pub device_id: Option<String>,
    pub platform: Platform,
    pub at: DateTime<Utc>,
}
