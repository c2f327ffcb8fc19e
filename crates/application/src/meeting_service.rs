use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use sandwich_core::{AppError, AppResult, NonEmptyString};
use sandwich_domain::{EffectiveUser, MeetingStatus, Permission};

use crate::authorization_service::require_permission;

/// Meeting projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    /// Stable meeting identifier.
    pub meeting_id: Uuid,
    /// Meeting title.
    pub title: String,
    /// Scheduled start in RFC3339.
    pub scheduled_at: String,
    /// Kind of meeting (e.g. "core_team", "committee").
    pub meeting_type: String,
    /// Agenda text.
    pub agenda: Option<String>,
    /// Minutes text, filled in after the meeting.
    pub minutes: Option<String>,
    /// Lifecycle state.
    pub status: MeetingStatus,
    /// Creation timestamp in RFC3339.
    pub created_at: String,
}

/// Input payload for scheduling or updating a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingInput {
    /// Meeting title.
    pub title: String,
    /// Scheduled start in RFC3339.
    pub scheduled_at: String,
    /// Kind of meeting.
    pub meeting_type: String,
    /// Agenda text.
    pub agenda: Option<String>,
    /// Minutes text.
    pub minutes: Option<String>,
    /// Lifecycle state.
    pub status: MeetingStatus,
}

impl MeetingInput {
    fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.title.as_str())?;

        chrono::DateTime::parse_from_rfc3339(&self.scheduled_at).map_err(|_| {
            AppError::Validation(format!(
                "invalid meeting time '{}', expected RFC3339",
                self.scheduled_at
            ))
        })?;

        Ok(())
    }
}

/// Repository port for meeting rows.
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Lists meetings, soonest first.
    async fn list(&self) -> AppResult<Vec<Meeting>>;

    /// Returns one meeting, if it exists.
    async fn find(&self, meeting_id: Uuid) -> AppResult<Option<Meeting>>;

    /// Creates a meeting and returns the stored row.
    async fn create(&self, input: &MeetingInput) -> AppResult<Meeting>;

    /// Updates a meeting; `NotFound` when it does not exist.
    async fn update(&self, meeting_id: Uuid, input: &MeetingInput) -> AppResult<Meeting>;
}

/// Application service for meetings, agendas, and minutes.
///
/// Meetings are never deleted; a cancelled meeting keeps its minutes trail
/// and is marked with the cancelled status instead.
#[derive(Clone)]
pub struct MeetingService {
    repository: Arc<dyn MeetingRepository>,
}

impl MeetingService {
    /// Creates a new meeting service.
    #[must_use]
    pub fn new(repository: Arc<dyn MeetingRepository>) -> Self {
        Self { repository }
    }

    /// Lists meetings.
    pub async fn list_meetings(&self, actor: &EffectiveUser) -> AppResult<Vec<Meeting>> {
        require_permission(actor, Permission::ViewMeetings)?;
        self.repository.list().await
    }

    /// Returns one meeting.
    pub async fn get_meeting(&self, actor: &EffectiveUser, meeting_id: Uuid) -> AppResult<Meeting> {
        require_permission(actor, Permission::ViewMeetings)?;
        self.repository
            .find(meeting_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("meeting '{meeting_id}' was not found")))
    }

    /// Schedules a meeting.
    pub async fn schedule_meeting(
        &self,
        actor: &EffectiveUser,
        input: MeetingInput,
    ) -> AppResult<Meeting> {
        require_permission(actor, Permission::EditMeetings)?;
        input.validate()?;
        self.repository.create(&input).await
    }

    /// Updates a meeting, including filling in minutes afterwards.
    pub async fn update_meeting(
        &self,
        actor: &EffectiveUser,
        meeting_id: Uuid,
        input: MeetingInput,
    ) -> AppResult<Meeting> {
        require_permission(actor, Permission::EditMeetings)?;
        input.validate()?;
        self.repository.update(meeting_id, &input).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::{EffectiveUser, MeetingStatus, Role};

    use super::{Meeting, MeetingInput, MeetingRepository, MeetingService};

    #[derive(Default)]
    struct FakeMeetingRepository {
        meetings: Mutex<Vec<Meeting>>,
    }

    #[async_trait]
    impl MeetingRepository for FakeMeetingRepository {
        async fn list(&self) -> AppResult<Vec<Meeting>> {
            Ok(self.meetings.lock().await.clone())
        }

        async fn find(&self, meeting_id: Uuid) -> AppResult<Option<Meeting>> {
            Ok(self
                .meetings
                .lock()
                .await
                .iter()
                .find(|meeting| meeting.meeting_id == meeting_id)
                .cloned())
        }

        async fn create(&self, input: &MeetingInput) -> AppResult<Meeting> {
            let meeting = Meeting {
                meeting_id: Uuid::new_v4(),
                title: input.title.clone(),
                scheduled_at: input.scheduled_at.clone(),
                meeting_type: input.meeting_type.clone(),
                agenda: input.agenda.clone(),
                minutes: input.minutes.clone(),
                status: input.status,
                created_at: "2025-01-01T00:00:00Z".to_owned(),
            };
            self.meetings.lock().await.push(meeting.clone());
            Ok(meeting)
        }

        async fn update(&self, meeting_id: Uuid, input: &MeetingInput) -> AppResult<Meeting> {
            let mut meetings = self.meetings.lock().await;
            let meeting = meetings
                .iter_mut()
                .find(|meeting| meeting.meeting_id == meeting_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("meeting '{meeting_id}' was not found"))
                })?;
            meeting.minutes = input.minutes.clone();
            meeting.status = input.status;
            Ok(meeting.clone())
        }
    }

    fn service() -> MeetingService {
        MeetingService::new(Arc::new(FakeMeetingRepository::default()))
    }

    fn user_with_role(role: Role) -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(role),
            permissions: role.default_permissions(),
        }
    }

    fn input(title: &str) -> MeetingInput {
        MeetingInput {
            title: title.to_owned(),
            scheduled_at: "2025-06-10T18:30:00Z".to_owned(),
            meeting_type: "committee".to_owned(),
            agenda: Some("Budget, host onboarding".to_owned()),
            minutes: None,
            status: MeetingStatus::Planned,
        }
    }

    #[tokio::test]
    async fn coordinators_schedule_and_record_minutes() {
        let service = service();
        let coordinator = user_with_role(Role::Coordinator);

        let scheduled = match service
            .schedule_meeting(&coordinator, input("June committee"))
            .await
        {
            Ok(meeting) => meeting,
            Err(error) => panic!("schedule failed: {error}"),
        };

        let mut with_minutes = input("June committee");
        with_minutes.minutes = Some("Attendance 9; approved budget.".to_owned());
        with_minutes.status = MeetingStatus::Completed;
        let updated = service
            .update_meeting(&coordinator, scheduled.meeting_id, with_minutes)
            .await;
        assert_eq!(
            updated.ok().and_then(|meeting| meeting.minutes),
            Some("Attendance 9; approved budget.".to_owned())
        );
    }

    #[tokio::test]
    async fn volunteers_view_but_cannot_schedule() {
        let service = service();
        let volunteer = user_with_role(Role::Volunteer);

        let listed = service.list_meetings(&volunteer).await;
        assert!(listed.is_ok());

        let denied = service.schedule_meeting(&volunteer, input("Rogue meeting")).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let updated = service
            .update_meeting(&volunteer, Uuid::new_v4(), input("Rogue meeting"))
            .await;
        assert!(matches!(updated, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn meeting_times_must_be_rfc3339() {
        let service = service();
        let coordinator = user_with_role(Role::Coordinator);

        let mut bad_time = input("June committee");
        bad_time.scheduled_at = "tuesday evening".to_owned();
        let rejected = service.schedule_meeting(&coordinator, bad_time).await;
        assert!(matches!(rejected, Err(AppError::Validation(_))));
    }
}
