use axum::Json;
use axum::extract::{Extension, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use sandwich_domain::EffectiveUser;

use crate::dto::CollectionReportResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn collection_report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<CollectionReportResponse>> {
    let report = state.report_service.collection_report(&user).await?;
    Ok(Json(CollectionReportResponse::from(report)))
}

pub async fn export_host_totals_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Response> {
    let csv = state.report_service.export_host_totals_csv(&user).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"host-totals.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
