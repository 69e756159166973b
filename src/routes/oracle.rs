use axum::extract::{Query, State};
use axum::Json;
use common::Snapshot;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_WINDOW_LEN: usize = 32;

#[derive(Debug, Default, Deserialize)]
pub struct RunParams {
    /// Free-form lookback such as `2h` or `90m`. Defaults to the configured window.
    pub window: Option<String>,
}

/// `GET /oracle/run?window=` runs one full oracle pass.
pub async fn run_oracle(
    State(state): State<AppState>,
    Query(params): Query<RunParams>,
) -> AppResult<Json<Snapshot>> {
    if let Some(window) = &params.window {
        if window.chars().count() > MAX_WINDOW_LEN {
            return Err(AppError::BadRequest(format!(
                "window must be at most {MAX_WINDOW_LEN} characters"
            )));
        }
    }

    let snapshot = state.oracle.run(params.window.as_deref()).await?;
    Ok(Json(snapshot))
}
