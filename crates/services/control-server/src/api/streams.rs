//! Stream worker endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use streamgate_core::{LaunchError, StopError};

use super::{AppState, ErrorResponse};

/// Request body for `POST /api/start-stream`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStreamRequest {
    /// Stream URL for the worker. Falls back to the configured default.
    #[serde(default)]
    pub stream_url: Option<String>,
}

/// Response body for `POST /api/start-stream`.
#[derive(Debug, Serialize)]
pub struct StartStreamResponse {
    pub message: String,

    /// OS pid of the spawned worker; pass it back to stop the stream.
    pub pid: u32,
}

/// Request body for `POST /api/stop-stream`.
#[derive(Debug, Deserialize)]
pub struct StopStreamRequest {
    /// Pid returned by a previous start request.
    pub pid: u32,
}

/// Response body for `POST /api/stop-stream`.
#[derive(Debug, Serialize)]
pub struct StopStreamResponse {
    pub message: String,
}

/// One live worker in the `GET /api/streams` listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub pid: u32,
    pub stream_url: String,
    pub state: String,
    pub started_at: String,
}

/// Response body for `GET /api/streams`.
#[derive(Debug, Serialize)]
pub struct ListStreamsResponse {
    pub streams: Vec<StreamInfo>,
}

/// Map a launch failure to a status code and error envelope.
fn map_launch_error(e: LaunchError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &e {
        LaunchError::NoUrlConfigured => (StatusCode::BAD_REQUEST, "no_url_configured"),
        LaunchError::ExecutableNotFound(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "executable_not_found")
        }
        LaunchError::SpawnFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "spawn_failed"),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: e.to_string(),
        }),
    )
}

/// Map a stop failure to a status code and error envelope.
fn map_stop_error(e: StopError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &e {
        // "not found" is the wire literal clients already match on.
        StopError::NotFound => (StatusCode::NOT_FOUND, "not found"),
        StopError::SignalFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "signal_failed"),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: e.to_string(),
        }),
    )
}

/// Start a stream worker.
///
/// POST /api/start-stream
///
/// The body is optional; a bare POST starts a worker on the configured
/// default stream URL.
pub async fn start_stream(
    State(state): State<AppState>,
    body: Option<Json<StartStreamRequest>>,
) -> Result<Json<StartStreamResponse>, (StatusCode, Json<ErrorResponse>)> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let handle = state
        .launcher
        .start(req.stream_url)
        .await
        .map_err(map_launch_error)?;

    Ok(Json(StartStreamResponse {
        message: "Stream started".to_string(),
        pid: handle.pid,
    }))
}

/// Request termination of a stream worker.
///
/// POST /api/stop-stream
pub async fn stop_stream(
    State(state): State<AppState>,
    Json(req): Json<StopStreamRequest>,
) -> Result<Json<StopStreamResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.launcher.stop(req.pid).await.map_err(map_stop_error)?;

    Ok(Json(StopStreamResponse {
        message: "Stream stopped".to_string(),
    }))
}

/// List live stream workers.
///
/// GET /api/streams
pub async fn list_streams(State(state): State<AppState>) -> Json<ListStreamsResponse> {
    let mut streams = Vec::new();
    for handle in state.registry.active().await {
        streams.push(StreamInfo {
            pid: handle.pid,
            stream_url: handle.stream_url.clone(),
            state: handle.state().await.label().to_string(),
            started_at: handle.started_at.to_rfc3339(),
        });
    }
    Json(ListStreamsResponse { streams })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_errors_map_to_documented_statuses() {
        let (status, body) = map_launch_error(LaunchError::NoUrlConfigured);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "no_url_configured");

        let (status, body) =
            map_launch_error(LaunchError::ExecutableNotFound("python".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "executable_not_found");
    }

    #[test]
    fn stop_errors_map_to_documented_statuses() {
        let (status, body) = map_stop_error(StopError::NotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "not found");

        let (status, body) = map_stop_error(StopError::SignalFailed(
            std::io::Error::from_raw_os_error(1),
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "signal_failed");
    }

    #[test]
    fn start_request_accepts_camel_case_and_empty_bodies() {
        let req: StartStreamRequest =
            serde_json::from_str(r#"{"streamUrl":"rtsp://example/stream1"}"#).unwrap();
        assert_eq!(req.stream_url.as_deref(), Some("rtsp://example/stream1"));

        let req: StartStreamRequest = serde_json::from_str("{}").unwrap();
        assert!(req.stream_url.is_none());
    }
}
