use axum::{extract::State, Extension, Json};

use gramlens_graph::{build_dashboard, DashboardPayload};

use crate::middleware::RequestId;

use super::{map_graph_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardPayload>>, ApiError> {
    let payload = build_dashboard(&state.client, &state.config)
        .await
        .map_err(|e| map_graph_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: payload,
        meta: ResponseMeta::new(req_id.0),
    }))
}
