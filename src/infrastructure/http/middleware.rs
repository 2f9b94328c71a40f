//! HTTP Middleware
//!
//! 业务错误以 errno 的形式随 200 返回，由 `ApiError::into_response` 记录；
//! 这里只处理框架层面的失败（路由不存在、请求体超限、JSON 解析失败等），
//! 同时记录耗时较长的请求（转换请求通常需要数秒到数分钟）。

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// 超过该耗时的请求以 info 级别记录
const SLOW_REQUEST: Duration = Duration::from_secs(5);

/// 请求日志中间件
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, elapsed_ms, "HTTP server error");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, elapsed_ms, "HTTP request rejected");
    } else if started.elapsed() >= SLOW_REQUEST {
        tracing::info!(%method, %path, status, elapsed_ms, "Slow request completed");
    }

    response
}
