use sandwich_domain::GroupCollection;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a volunteer project.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub assignees: Vec<String>,
    pub due_date: Option<String>,
    pub created_at: String,
}

impl From<sandwich_application::Project> for ProjectResponse {
    fn from(value: sandwich_application::Project) -> Self {
        Self {
            project_id: value.project_id.to_string(),
            title: value.title,
            description: value.description,
            status: value.status.as_str().to_owned(),
            assignees: value.assignees,
            due_date: value.due_date,
            created_at: value.created_at,
        }
    }
}

/// Incoming payload for creating or updating a project.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-project-request.ts"
)]
pub struct SaveProjectRequest {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `available` when omitted.
    pub status: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub due_date: Option<String>,
}

/// API representation of a host site.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/host-response.ts"
)]
pub struct HostResponse {
    pub host_id: String,
    pub name: String,
    pub address: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<sandwich_application::Host> for HostResponse {
    fn from(value: sandwich_application::Host) -> Self {
        Self {
            host_id: value.host_id.to_string(),
            name: value.name,
            address: value.address,
            contact_name: value.contact_name,
            contact_phone: value.contact_phone,
            is_active: value.is_active,
            notes: value.notes,
            created_at: value.created_at,
        }
    }
}

/// Incoming payload for creating or updating a host site.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-host-request.ts"
)]
pub struct SaveHostRequest {
    pub name: String,
    pub address: String,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

/// API representation of a delivery driver.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/driver-response.ts"
)]
pub struct DriverResponse {
    pub driver_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_notes: Option<String>,
    pub host_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<sandwich_application::Driver> for DriverResponse {
    fn from(value: sandwich_application::Driver) -> Self {
        Self {
            driver_id: value.driver_id.to_string(),
            name: value.name,
            phone: value.phone,
            email: value.email,
            vehicle_notes: value.vehicle_notes,
            host_id: value.host_id.map(|host_id| host_id.to_string()),
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}

/// Incoming payload for creating or updating a driver.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-driver-request.ts"
)]
pub struct SaveDriverRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_notes: Option<String>,
    pub host_id: Option<String>,
    pub is_active: Option<bool>,
}

/// One group tally inside a collection payload.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/group-collection-payload.ts"
)]
pub struct GroupCollectionPayload {
    pub group_name: String,
    pub sandwich_count: u32,
}

impl From<GroupCollection> for GroupCollectionPayload {
    fn from(value: GroupCollection) -> Self {
        Self {
            group_name: value.group_name,
            sandwich_count: value.sandwich_count,
        }
    }
}

impl From<GroupCollectionPayload> for GroupCollection {
    fn from(value: GroupCollectionPayload) -> Self {
        Self {
            group_name: value.group_name,
            sandwich_count: value.sandwich_count,
        }
    }
}

/// API representation of a sandwich collection.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/collection-response.ts"
)]
pub struct CollectionResponse {
    pub collection_id: String,
    pub host_name: String,
    pub collection_date: String,
    pub individual_sandwiches: i32,
    pub group_collections: Vec<GroupCollectionPayload>,
    pub total_sandwiches: i64,
    pub submitted_by: String,
    pub created_at: String,
}

impl From<sandwich_application::Collection> for CollectionResponse {
    fn from(value: sandwich_application::Collection) -> Self {
        let total_sandwiches = value.total_sandwiches();
        Self {
            collection_id: value.collection_id.to_string(),
            host_name: value.host_name,
            collection_date: value.collection_date,
            individual_sandwiches: value.individual_sandwiches,
            group_collections: value
                .group_collections
                .into_iter()
                .map(GroupCollectionPayload::from)
                .collect(),
            total_sandwiches,
            submitted_by: value.submitted_by.to_string(),
            created_at: value.created_at,
        }
    }
}

/// Incoming payload for submitting or correcting a collection.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-collection-request.ts"
)]
pub struct SaveCollectionRequest {
    pub host_name: String,
    pub collection_date: String,
    pub individual_sandwiches: i32,
    pub group_collections: Option<Vec<GroupCollectionPayload>>,
}

/// API representation of a chat message.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/message-response.ts"
)]
pub struct MessageResponse {
    pub message_id: String,
    pub channel: String,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    pub created_at: String,
}

impl From<sandwich_application::Message> for MessageResponse {
    fn from(value: sandwich_application::Message) -> Self {
        Self {
            message_id: value.message_id.to_string(),
            channel: value.channel.as_str().to_owned(),
            sender_id: value.sender_id.to_string(),
            sender_name: value.sender_name,
            body: value.body,
            created_at: value.created_at,
        }
    }
}

/// Incoming payload for posting a chat message.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/post-message-request.ts"
)]
pub struct PostMessageRequest {
    pub body: String,
}

/// API representation of a meeting.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/meeting-response.ts"
)]
pub struct MeetingResponse {
    pub meeting_id: String,
    pub title: String,
    pub scheduled_at: String,
    pub meeting_type: String,
    pub agenda: Option<String>,
    pub minutes: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl From<sandwich_application::Meeting> for MeetingResponse {
    fn from(value: sandwich_application::Meeting) -> Self {
        Self {
            meeting_id: value.meeting_id.to_string(),
            title: value.title,
            scheduled_at: value.scheduled_at,
            meeting_type: value.meeting_type,
            agenda: value.agenda,
            minutes: value.minutes,
            status: value.status.as_str().to_owned(),
            created_at: value.created_at,
        }
    }
}

/// Incoming payload for scheduling or updating a meeting.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-meeting-request.ts"
)]
pub struct SaveMeetingRequest {
    pub title: String,
    pub scheduled_at: String,
    pub meeting_type: Option<String>,
    pub agenda: Option<String>,
    pub minutes: Option<String>,
    /// Defaults to `planned` when omitted.
    pub status: Option<String>,
}

/// Overall collection totals.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/collection-totals-response.ts"
)]
pub struct CollectionTotalsResponse {
    pub collection_count: i64,
    pub total_sandwiches: i64,
}

/// Per-host collection totals.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/host-totals-response.ts"
)]
pub struct HostTotalsResponse {
    pub host_name: String,
    pub collection_count: i64,
    pub total_sandwiches: i64,
}

/// Per-week collection totals.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/weekly-totals-response.ts"
)]
pub struct WeeklyTotalsResponse {
    pub week_start: String,
    pub total_sandwiches: i64,
}

/// Combined collection report payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/collection-report-response.ts"
)]
pub struct CollectionReportResponse {
    pub totals: CollectionTotalsResponse,
    pub by_host: Vec<HostTotalsResponse>,
    pub by_week: Vec<WeeklyTotalsResponse>,
}

impl From<sandwich_application::CollectionReport> for CollectionReportResponse {
    fn from(value: sandwich_application::CollectionReport) -> Self {
        Self {
            totals: CollectionTotalsResponse {
                collection_count: value.totals.collection_count,
                total_sandwiches: value.totals.total_sandwiches,
            },
            by_host: value
                .by_host
                .into_iter()
                .map(|row| HostTotalsResponse {
                    host_name: row.host_name,
                    collection_count: row.collection_count,
                    total_sandwiches: row.total_sandwiches,
                })
                .collect(),
            by_week: value
                .by_week
                .into_iter()
                .map(|row| WeeklyTotalsResponse {
                    week_start: row.week_start,
                    total_sandwiches: row.total_sandwiches,
                })
                .collect(),
        }
    }
}
