use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use sandwich_core::AppResult;
use sandwich_domain::{EffectiveUser, Permission};

use crate::authorization_service::require_permission;

/// Aggregate totals across all collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionTotals {
    /// Number of collection submissions.
    pub collection_count: i64,
    /// Total sandwiches across all submissions.
    pub total_sandwiches: i64,
}

/// Per-host aggregate totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTotals {
    /// Host site name.
    pub host_name: String,
    /// Number of submissions for this host.
    pub collection_count: i64,
    /// Total sandwiches for this host.
    pub total_sandwiches: i64,
}

/// Per-week aggregate totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTotals {
    /// Monday of the week (ISO `YYYY-MM-DD`).
    pub week_start: String,
    /// Total sandwiches collected that week.
    pub total_sandwiches: i64,
}

/// Repository port for collection aggregation queries.
#[async_trait]
pub trait CollectionStatsRepository: Send + Sync {
    /// Overall totals.
    async fn totals(&self) -> AppResult<CollectionTotals>;

    /// Totals grouped by host, largest first.
    async fn totals_by_host(&self) -> AppResult<Vec<HostTotals>>;

    /// Totals grouped by ISO week, newest first.
    async fn totals_by_week(&self) -> AppResult<Vec<WeeklyTotals>>;
}

/// Report payload combining the standard aggregations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    /// Overall totals.
    pub totals: CollectionTotals,
    /// Totals grouped by host.
    pub by_host: Vec<HostTotals>,
    /// Totals grouped by week.
    pub by_week: Vec<WeeklyTotals>,
}

/// Application service for read-only collection reporting.
#[derive(Clone)]
pub struct ReportService {
    repository: Arc<dyn CollectionStatsRepository>,
}

impl ReportService {
    /// Creates a new report service.
    #[must_use]
    pub fn new(repository: Arc<dyn CollectionStatsRepository>) -> Self {
        Self { repository }
    }

    /// Builds the standard collection report.
    pub async fn collection_report(&self, actor: &EffectiveUser) -> AppResult<CollectionReport> {
        require_permission(actor, Permission::ViewReports)?;

        Ok(CollectionReport {
            totals: self.repository.totals().await?,
            by_host: self.repository.totals_by_host().await?,
            by_week: self.repository.totals_by_week().await?,
        })
    }

    /// Renders the per-host totals as CSV for download.
    pub async fn export_host_totals_csv(&self, actor: &EffectiveUser) -> AppResult<String> {
        require_permission(actor, Permission::ExportReports)?;

        let rows = self.repository.totals_by_host().await?;
        let mut csv = String::from("host_name,collection_count,total_sandwiches\n");
        for row in rows {
            let _ = writeln!(
                csv,
                "{},{},{}",
                escape_csv_field(&row.host_name),
                row.collection_count,
                row.total_sandwiches
            );
        }

        Ok(csv)
    }
}

fn escape_csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::{EffectiveUser, Role};

    use super::{
        CollectionStatsRepository, CollectionTotals, HostTotals, ReportService, WeeklyTotals,
        escape_csv_field,
    };

    struct FakeStatsRepository;

    #[async_trait]
    impl CollectionStatsRepository for FakeStatsRepository {
        async fn totals(&self) -> AppResult<CollectionTotals> {
            Ok(CollectionTotals {
                collection_count: 12,
                total_sandwiches: 1480,
            })
        }

        async fn totals_by_host(&self) -> AppResult<Vec<HostTotals>> {
            Ok(vec![
                HostTotals {
                    host_name: "North site".to_owned(),
                    collection_count: 8,
                    total_sandwiches: 900,
                },
                HostTotals {
                    host_name: "Church, South".to_owned(),
                    collection_count: 4,
                    total_sandwiches: 580,
                },
            ])
        }

        async fn totals_by_week(&self) -> AppResult<Vec<WeeklyTotals>> {
            Ok(vec![WeeklyTotals {
                week_start: "2025-06-02".to_owned(),
                total_sandwiches: 740,
            }])
        }
    }

    fn user_with_role(role: Role) -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(role),
            permissions: role.default_permissions(),
        }
    }

    #[tokio::test]
    async fn viewers_read_reports_but_cannot_export() {
        let service = ReportService::new(Arc::new(FakeStatsRepository));
        let viewer = user_with_role(Role::Viewer);

        let report = service.collection_report(&viewer).await;
        assert_eq!(
            report.map(|report| report.totals.total_sandwiches).ok(),
            Some(1480)
        );

        let export = service.export_host_totals_csv(&viewer).await;
        assert!(matches!(export, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn export_renders_csv_with_escaped_fields() {
        let service = ReportService::new(Arc::new(FakeStatsRepository));
        let coordinator = user_with_role(Role::Coordinator);

        let csv = match service.export_host_totals_csv(&coordinator).await {
            Ok(csv) => csv,
            Err(error) => panic!("export failed: {error}"),
        };

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("host_name,collection_count,total_sandwiches")
        );
        assert_eq!(lines.next(), Some("North site,8,900"));
        assert_eq!(lines.next(), Some("\"Church, South\",4,580"));
    }

    #[test]
    fn csv_escaping_doubles_embedded_quotes() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
