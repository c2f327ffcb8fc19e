//! Enumerations and value types shared by the functional record services.

use std::str::FromStr;

use sandwich_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a volunteer project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Open for volunteers to claim.
    Available,
    /// Claimed and being worked.
    InProgress,
    /// Finished.
    Completed,
}

impl ProjectStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "available" => Ok(Self::Available),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::Validation(format!(
                "unknown project status '{value}'"
            ))),
        }
    }
}

/// Committee chat channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageChannel {
    /// Open to every authenticated user.
    General,
    /// Committee coordination.
    Committee,
    /// Host site coordination.
    Hosts,
    /// Driver logistics.
    Drivers,
    /// Core team planning.
    CoreTeam,
}

impl MessageChannel {
    /// Returns a stable storage value for this channel.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Committee => "committee",
            Self::Hosts => "hosts",
            Self::Drivers => "drivers",
            Self::CoreTeam => "core_team",
        }
    }
}

impl FromStr for MessageChannel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "general" => Ok(Self::General),
            "committee" => Ok(Self::Committee),
            "hosts" => Ok(Self::Hosts),
            "drivers" => Ok(Self::Drivers),
            "core_team" => Ok(Self::CoreTeam),
            _ => Err(AppError::Validation(format!(
                "unknown message channel '{value}'"
            ))),
        }
    }
}

/// Lifecycle state of a meeting record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Scheduled and upcoming.
    Planned,
    /// Held; minutes may still be pending.
    Completed,
    /// Called off.
    Cancelled,
}

impl MeetingStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MeetingStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "planned" => Ok(Self::Planned),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown meeting status '{value}'"
            ))),
        }
    }
}

/// One named group's sandwich tally inside a collection submission.
///
/// Stored as a JSON array on the collection row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCollection {
    /// Name of the contributing group.
    pub group_name: String,
    /// Sandwiches contributed by the group.
    pub sandwich_count: u32,
}

impl GroupCollection {
    /// Validates a group entry: non-empty name, non-zero count.
    pub fn validate(&self) -> AppResult<()> {
        if self.group_name.trim().is_empty() {
            return Err(AppError::Validation(
                "group name must not be empty".to_owned(),
            ));
        }

        if self.sandwich_count == 0 {
            return Err(AppError::Validation(
                "group sandwich count must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{GroupCollection, MeetingStatus, MessageChannel, ProjectStatus};

    #[test]
    fn status_values_roundtrip() {
        for status in ["available", "in_progress", "completed"] {
            let parsed = ProjectStatus::from_str(status);
            assert_eq!(parsed.ok().map(|value| value.as_str()), Some(status));
        }
        assert!(ProjectStatus::from_str("archived").is_err());
    }

    #[test]
    fn channel_values_roundtrip() {
        for channel in ["general", "committee", "hosts", "drivers", "core_team"] {
            let parsed = MessageChannel::from_str(channel);
            assert_eq!(parsed.ok().map(|value| value.as_str()), Some(channel));
        }
    }

    #[test]
    fn meeting_status_rejects_unknown_values() {
        assert!(MeetingStatus::from_str("postponed").is_err());
    }

    #[test]
    fn group_collection_rejects_empty_entries() {
        let unnamed = GroupCollection {
            group_name: "  ".to_owned(),
            sandwich_count: 5,
        };
        assert!(unnamed.validate().is_err());

        let empty = GroupCollection {
            group_name: "Scout Troop 12".to_owned(),
            sandwich_count: 0,
        };
        assert!(empty.validate().is_err());
    }
}
