use crate::error::AppError;
use crate::models::job::DispatchRequest;
use crate::state::AppState;

pub async fn enqueue_job(state: &AppState, request: DispatchRequest) -> Result<(), AppError> {
    state
        .job_tx
        .send(request)
        .await
        .map_err(|err| AppError::Internal(format!("dispatch queue send failed: {err}")))?;

    state.metrics.jobs_in_queue.inc();
    Ok(())
}
