use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of change a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    PropertyAdded,
    PropertyUpdated,
    PropertyDeleted,
    AgentAdded,
    AgentUpdated,
    AgentDeleted,
    AdminAdded,
    AdminUpdated,
    AdminDeleted,
    System,
}

impl NotificationKind {
    /// The exact string the backend stores for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PropertyAdded => "PROPERTY_ADDED",
            NotificationKind::PropertyUpdated => "PROPERTY_UPDATED",
            NotificationKind::PropertyDeleted => "PROPERTY_DELETED",
            NotificationKind::AgentAdded => "AGENT_ADDED",
            NotificationKind::AgentUpdated => "AGENT_UPDATED",
            NotificationKind::AgentDeleted => "AGENT_DELETED",
            NotificationKind::AdminAdded => "ADMIN_ADDED",
            NotificationKind::AdminUpdated => "ADMIN_UPDATED",
            NotificationKind::AdminDeleted => "ADMIN_DELETED",
            NotificationKind::System => "SYSTEM",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "propertyadded" => Ok(NotificationKind::PropertyAdded),
            "propertyupdated" => Ok(NotificationKind::PropertyUpdated),
            "propertydeleted" => Ok(NotificationKind::PropertyDeleted),
            "agentadded" => Ok(NotificationKind::AgentAdded),
            "agentupdated" => Ok(NotificationKind::AgentUpdated),
            "agentdeleted" => Ok(NotificationKind::AgentDeleted),
            "adminadded" => Ok(NotificationKind::AdminAdded),
            "adminupdated" => Ok(NotificationKind::AdminUpdated),
            "admindeleted" => Ok(NotificationKind::AdminDeleted),
            "system" => Ok(NotificationKind::System),
            other => anyhow::bail!("unknown notification kind '{other}'"),
        }
    }
}

/// One entry of the notification feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Backend-assigned id, or `local-<uuid>` for records created while the
    /// backend was unreachable.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    /// The record that triggered the notification, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Display-only age ("5 min ago"); the feed recomputes it on every read
    /// so it is never persisted.
    #[serde(skip)]
    pub time_ago: String,
}

impl Notification {
    /// Build the fallback record kept locally when the backend cannot be
    /// reached.
    pub fn local(
        kind: NotificationKind,
        message: impl Into<String>,
        entity_id: Option<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            id: format!("local-{}", Uuid::new_v4()),
            kind,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
            entity_id,
            entity_name,
            created_by: Some("System".to_string()),
            time_ago: String::new(),
        }
    }

    /// True for records that only exist in the local cache.
    pub fn is_local(&self) -> bool {
        self.id.starts_with("local-")
    }
}

/// Payload sent to the backend when recording a new notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

/// Human-readable age of a timestamp: "just now" under a minute, then minutes,
/// hours and days, then an absolute date once it is older than a week. Future
/// timestamps (clock skew between backend and client) read as "just now".
pub fn relative_time(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(when);
    let secs = elapsed.num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = elapsed.num_minutes();
    if mins < 60 {
        return format!("{mins} min ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{hours} hours ago")
        };
    }
    let days = elapsed.num_days();
    if days < 7 {
        return if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{days} days ago")
        };
    }
    when.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn wire_shape_matches_backend() {
        let json = serde_json::json!({
            "_id": "66aa",
            "type": "PROPERTY_ADDED",
            "message": "Property \"Marina Heights 2BR\" was added",
            "read": false,
            "createdAt": "2024-05-01T10:30:00Z",
            "entityId": "p1",
            "entityName": "Marina Heights 2BR",
            "createdBy": "admin"
        });

        let notification: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(notification.kind, NotificationKind::PropertyAdded);
        assert!(!notification.read);
        assert_eq!(notification.entity_name.as_deref(), Some("Marina Heights 2BR"));

        let back = serde_json::to_value(&notification).unwrap();
        assert_eq!(back["_id"], "66aa");
        assert_eq!(back["type"], "PROPERTY_ADDED");
        // Display-only field never reaches the wire.
        assert!(back.get("timeAgo").is_none());
    }

    #[test]
    fn kind_wire_strings_round_trip() {
        for kind in [
            NotificationKind::PropertyAdded,
            NotificationKind::AgentUpdated,
            NotificationKind::AdminDeleted,
            NotificationKind::System,
        ] {
            let encoded = serde_json::to_string(&kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.as_str()));
            let decoded: NotificationKind = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, kind);
        }
    }

    #[test]
    fn kind_parses_cli_spellings() {
        assert_eq!(
            "property-added".parse::<NotificationKind>().unwrap(),
            NotificationKind::PropertyAdded
        );
        assert_eq!(
            "AGENT_DELETED".parse::<NotificationKind>().unwrap(),
            NotificationKind::AgentDeleted
        );
        assert!("party".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn local_records_are_marked() {
        let n = Notification::local(NotificationKind::System, "offline", None, None);
        assert!(n.is_local());
        assert!(!n.read);
        assert_eq!(n.created_by.as_deref(), Some("System"));

        let remote = Notification {
            id: "66aa".to_string(),
            ..Notification::local(NotificationKind::System, "remote", None, None)
        };
        assert!(!remote.is_local());
    }

    #[test]
    fn relative_time_buckets() {
        let now: DateTime<Utc> = "2024-05-01T12:00:00Z".parse().unwrap();
        let cases = [
            (Duration::seconds(5), "just now"),
            (Duration::seconds(59), "just now"),
            (Duration::minutes(5), "5 min ago"),
            (Duration::minutes(59), "59 min ago"),
            (Duration::hours(1), "1 hour ago"),
            (Duration::hours(23), "23 hours ago"),
            (Duration::days(1), "1 day ago"),
            (Duration::days(6), "6 days ago"),
        ];
        for (age, expected) in cases {
            assert_eq!(relative_time(now - age, now), expected, "{age:?}");
        }
        assert_eq!(relative_time(now - Duration::days(10), now), "Apr 21, 2024");
        // Clock skew: a timestamp slightly in the future is not an error.
        assert_eq!(relative_time(now + Duration::seconds(30), now), "just now");
    }
}
