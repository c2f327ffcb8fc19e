//! PostgreSQL-backed collection repository and aggregation queries.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sandwich_application::{
    Collection, CollectionInput, CollectionRepository, CollectionStatsRepository,
    CollectionTotals, HostTotals, WeeklyTotals,
};
use sandwich_core::{AppError, AppResult, UserId};
use sandwich_domain::GroupCollection;

/// PostgreSQL implementation of the collection repository and stats ports.
///
/// Group tallies are stored as a JSONB array; a denormalized
/// `total_sandwiches` column is written on every mutation so the report
/// aggregations stay plain SUMs.
#[derive(Clone)]
pub struct PostgresCollectionRepository {
    pool: PgPool,
}

impl PostgresCollectionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn total_sandwiches(input: &CollectionInput) -> i64 {
    i64::from(input.individual_sandwiches)
        + input
            .group_collections
            .iter()
            .map(|group| i64::from(group.sandwich_count))
            .sum::<i64>()
}

fn encode_groups(groups: &[GroupCollection]) -> AppResult<serde_json::Value> {
    serde_json::to_value(groups)
        .map_err(|error| AppError::Internal(format!("failed to encode group tallies: {error}")))
}

#[derive(Debug, sqlx::FromRow)]
struct CollectionRow {
    id: Uuid,
    host_name: String,
    collection_date: String,
    individual_sandwiches: i32,
    group_collections: serde_json::Value,
    submitted_by: Uuid,
    created_at: String,
}

impl TryFrom<CollectionRow> for Collection {
    type Error = AppError;

    fn try_from(row: CollectionRow) -> Result<Self, Self::Error> {
        let group_collections: Vec<GroupCollection> =
            serde_json::from_value(row.group_collections).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode group tallies of collection '{}': {error}",
                    row.id
                ))
            })?;

        Ok(Self {
            collection_id: row.id,
            host_name: row.host_name,
            collection_date: row.collection_date,
            individual_sandwiches: row.individual_sandwiches,
            group_collections,
            submitted_by: UserId::from_uuid(row.submitted_by),
            created_at: row.created_at,
        })
    }
}

const COLLECTION_COLUMNS: &str = r#"
    id, host_name,
    to_char(collection_date, 'YYYY-MM-DD') AS collection_date,
    individual_sandwiches, group_collections, submitted_by,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

#[async_trait]
impl CollectionRepository for PostgresCollectionRepository {
    async fn list(&self) -> AppResult<Vec<Collection>> {
        let rows = sqlx::query_as::<_, CollectionRow>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections ORDER BY collection_date DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list collections: {error}")))?;

        rows.into_iter().map(Collection::try_from).collect()
    }

    async fn find(&self, collection_id: Uuid) -> AppResult<Option<Collection>> {
        let row = sqlx::query_as::<_, CollectionRow>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = $1"
        ))
        .bind(collection_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load collection: {error}")))?;

        row.map(Collection::try_from).transpose()
    }

    async fn create(
        &self,
        input: &CollectionInput,
        submitted_by: UserId,
    ) -> AppResult<Collection> {
        let row = sqlx::query_as::<_, CollectionRow>(&format!(
            r#"
            INSERT INTO collections (
                host_name, collection_date, individual_sandwiches,
                group_collections, total_sandwiches, submitted_by
            )
            VALUES ($1, $2::date, $3, $4, $5, $6)
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(input.host_name.trim())
        .bind(input.collection_date.as_str())
        .bind(input.individual_sandwiches)
        .bind(encode_groups(&input.group_collections)?)
        .bind(total_sandwiches(input))
        .bind(submitted_by.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create collection: {error}")))?;

        Collection::try_from(row)
    }

    async fn update(
        &self,
        collection_id: Uuid,
        input: &CollectionInput,
    ) -> AppResult<Collection> {
        let row = sqlx::query_as::<_, CollectionRow>(&format!(
            r#"
            UPDATE collections
            SET host_name = $2,
                collection_date = $3::date,
                individual_sandwiches = $4,
                group_collections = $5,
                total_sandwiches = $6
            WHERE id = $1
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(collection_id)
        .bind(input.host_name.trim())
        .bind(input.collection_date.as_str())
        .bind(input.individual_sandwiches)
        .bind(encode_groups(&input.group_collections)?)
        .bind(total_sandwiches(input))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update collection: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("collection '{collection_id}' was not found"))
        })?;

        Collection::try_from(row)
    }

    async fn delete(&self, collection_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(collection_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete collection: {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "collection '{collection_id}' was not found"
            )));
        }

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    collection_count: i64,
    total_sandwiches: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct HostTotalsRow {
    host_name: String,
    collection_count: i64,
    total_sandwiches: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct WeeklyTotalsRow {
    week_start: String,
    total_sandwiches: i64,
}

#[async_trait]
impl CollectionStatsRepository for PostgresCollectionRepository {
    async fn totals(&self) -> AppResult<CollectionTotals> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                COUNT(*) AS collection_count,
                COALESCE(SUM(total_sandwiches), 0) AS total_sandwiches
            FROM collections
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to compute collection totals: {error}"))
        })?;

        Ok(CollectionTotals {
            collection_count: row.collection_count,
            total_sandwiches: row.total_sandwiches,
        })
    }

    async fn totals_by_host(&self) -> AppResult<Vec<HostTotals>> {
        let rows = sqlx::query_as::<_, HostTotalsRow>(
            r#"
            SELECT
                host_name,
                COUNT(*) AS collection_count,
                COALESCE(SUM(total_sandwiches), 0) AS total_sandwiches
            FROM collections
            GROUP BY host_name
            ORDER BY total_sandwiches DESC, host_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to compute host totals: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| HostTotals {
                host_name: row.host_name,
                collection_count: row.collection_count,
                total_sandwiches: row.total_sandwiches,
            })
            .collect())
    }

    async fn totals_by_week(&self) -> AppResult<Vec<WeeklyTotals>> {
        let rows = sqlx::query_as::<_, WeeklyTotalsRow>(
            r#"
            SELECT
                to_char(date_trunc('week', collection_date), 'YYYY-MM-DD') AS week_start,
                COALESCE(SUM(total_sandwiches), 0) AS total_sandwiches
            FROM collections
            GROUP BY date_trunc('week', collection_date)
            ORDER BY date_trunc('week', collection_date) DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to compute weekly totals: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| WeeklyTotals {
                week_start: row.week_start,
                total_sandwiches: row.total_sandwiches,
            })
            .collect())
    }
}
