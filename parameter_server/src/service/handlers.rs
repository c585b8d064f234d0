use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{debug, error};

use super::ServiceContext;
use crate::{model::Model, storage::UpdateError};

/// The text the liveness probe answers with.
pub const SERVICE_NAME: &str = "parameter_server";

/// The acknowledgment of a completed update.
pub const UPDATE_COMPLETED: &str = "completed";

/// Builds the service's router.
///
/// # Arguments
/// * `ctx` - The shared context every request goes through.
///
/// # Returns
/// A router serving `GET /`, `GET /parameters` and `POST /update`.
pub fn router<M: Model + 'static>(ctx: Arc<ServiceContext<M>>) -> Router {
    let limit = ctx.max_payload_len();
    debug!(limit = limit; "update payload limit");

    Router::new()
        .route("/", get(home))
        .route("/parameters", get(parameters::<M>))
        .route("/update", post(update::<M>))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(ctx)
}

async fn home() -> &'static str {
    SERVICE_NAME
}

async fn parameters<M: Model>(State(ctx): State<Arc<ServiceContext<M>>>) -> Response {
    match ctx.fetch().await {
        Ok(bytes) => {
            debug!(bytes = bytes.len(); "serving parameters");
            ([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response()
        }
        Err(e) => {
            error!("failed to encode the parameter snapshot: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn update<M: Model>(
    State(ctx): State<Arc<ServiceContext<M>>>,
    payload: Bytes,
) -> Result<&'static str, UpdateError> {
    ctx.update(&payload).await?;
    Ok(UPDATE_COMPLETED)
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ApplyFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BudgetExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ApplyFailure;

    #[test]
    fn update_errors_map_to_statuses() {
        let shape = UpdateError::ShapeMismatch {
            expected: 2,
            got: 1,
        };
        assert_eq!(
            shape.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let decode = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header");
        let apply = UpdateError::ApplyFailed(ApplyFailure::Decode(decode));
        assert_eq!(
            apply.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let exhausted = UpdateError::BudgetExhausted {
            failures: 11,
            cause: None,
        };
        assert_eq!(
            exhausted.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
