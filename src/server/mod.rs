// Server module - HTTP surface for the ingestion and watermark pipelines
//
// One tokio task per connection; shared state is limited to the AppState
// handle. Routes: POST /upload, POST /watermark, JSON in and out.

use bytes::Bytes;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Instrument};

use crate::config::{LimitsConfig, ServerConfig};
use crate::error::ServiceError;
use crate::ingest::{self, UploadRequest};
use crate::pipeline::RequestContext;
use crate::rate_limit::{NoopRateLimiter, RateLimiter};
use crate::storage::ObjectStore;
use crate::watermark::{self, WatermarkRequest};

/// Shared state handed to every request.
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub limits: LimitsConfig,
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, limits: LimitsConfig) -> Self {
        Self {
            store,
            limits,
            limiter: Arc::new(NoopRateLimiter),
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }
}

/// Bind and serve until the process is terminated.
pub async fn run(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "Starting image service");

    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| handle(state.clone(), peer, req));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!(error = %err, "connection closed with error");
            }
        });
    }
}

async fn handle(
    state: Arc<AppState>,
    peer: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let ctx = RequestContext::new(req.method().as_str(), req.uri().path(), &peer.to_string());
    let span = tracing::info_span!(
        "request",
        id = %ctx.request_id(),
        method = %ctx.method(),
        path = %ctx.path(),
    );
    Ok(dispatch(state, ctx, req).instrument(span).await)
}

async fn dispatch(
    state: Arc<AppState>,
    ctx: RequestContext,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let result = match (method, path.as_str()) {
        (Method::POST, "/upload") => {
            let seconds = state.limits.upload_timeout_secs;
            with_deadline(seconds, upload(state, ctx, req)).await
        }
        (Method::POST, "/watermark") => {
            let seconds = state.limits.watermark_timeout_secs;
            with_deadline(seconds, apply_watermark(state, req)).await
        }
        _ => Err(ServiceError::NotFound("Not found".to_string())),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            warn!(status = err.status(), error = %err, "request failed");
            error_response(&err)
        }
    }
}

/// Bound a route's total work; dropping the future aborts in-flight
/// downloads and uploads.
async fn with_deadline<F>(seconds: u64, fut: F) -> Result<Response<Full<Bytes>>, ServiceError>
where
    F: Future<Output = Result<Response<Full<Bytes>>, ServiceError>>,
{
    match tokio::time::timeout(Duration::from_secs(seconds), fut).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout { seconds }),
    }
}

async fn upload(
    state: Arc<AppState>,
    ctx: RequestContext,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, ServiceError> {
    if state.limiter.is_rate_limited(&ctx) {
        return Err(ServiceError::RateLimited);
    }

    let payload: UploadRequest = read_json(req, state.limits.max_body_bytes).await?;
    let response = ingest::process_upload(state.store.clone(), &state.limits, payload).await?;
    Ok(json_response(StatusCode::OK, &response))
}

async fn apply_watermark(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, ServiceError> {
    let payload: WatermarkRequest = read_json(req, state.limits.max_body_bytes).await?;
    let response = watermark::process_watermark(state.store.clone(), payload).await?;
    Ok(json_response(StatusCode::OK, &response))
}

async fn read_json<T: DeserializeOwned>(
    req: Request<Incoming>,
    max_bytes: usize,
) -> Result<T, ServiceError> {
    let bytes = Limited::new(req.into_body(), max_bytes)
        .collect()
        .await
        .map_err(|_| ServiceError::BadRequest("Request body too large".to_string()))?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|_| ServiceError::BadRequest("Invalid JSON payload".to_string()))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn error_response(err: &ServiceError) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(
        status,
        &serde_json::json!({ "error": err.to_string(), "success": false }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let err = ServiceError::BadRequest("Invalid base64".to_string());
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid base64");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_504() {
        let err = ServiceError::Timeout { seconds: 120 };
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_json_response_serializes_value() {
        let response = json_response(
            StatusCode::OK,
            &serde_json::json!({"path": "images/a.png", "success": true}),
        );
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["path"], "images/a.png");
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_with_deadline_passes_through_result() {
        let result = with_deadline(5, async {
            Ok(json_response(StatusCode::OK, &serde_json::json!({})))
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_expires() {
        let result = with_deadline(1, async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(json_response(StatusCode::OK, &serde_json::json!({})))
        })
        .await;
        assert!(matches!(result, Err(ServiceError::Timeout { seconds: 1 })));
    }
}
