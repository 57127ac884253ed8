//! gRPC 追踪拦截器
//!
//! 从请求元数据中提取追踪 ID，写入请求扩展，供各个 handler 创建日志 span。

use std::time::Duration;

use tonic::{Request, Status};
use tracing::info_span;
use uuid::Uuid;

/// 按优先级依次尝试的追踪头
const TRACE_HEADERS: [&str; 3] = ["x-trace-id", "x-request-id", "x-correlation-id"];

/// 追踪信息
#[derive(Debug, Clone)]
pub struct TraceInfo {
    pub trace_id: String,
}

/// gRPC 拦截器：提取追踪 ID，缺失时生成一个
#[allow(clippy::result_large_err)]
pub fn tracing_interceptor(mut req: Request<()>) -> Result<Request<()>, Status> {
    let trace_id = extract_trace_id(&req).unwrap_or_else(|| Uuid::now_v7().to_string());
    req.extensions_mut().insert(TraceInfo { trace_id });
    Ok(req)
}

fn extract_trace_id<T>(req: &Request<T>) -> Option<String> {
    let metadata = req.metadata();
    TRACE_HEADERS.iter().find_map(|key| {
        metadata
            .get(*key)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// 读取拦截器写入的追踪 ID
pub fn trace_id_of<T>(req: &Request<T>) -> &str {
    req.extensions()
        .get::<TraceInfo>()
        .map(|t| t.trace_id.as_str())
        .unwrap_or("unknown")
}

/// 调用方通过 `grpc-timeout` 头传入的剩余时间
///
/// 格式为最多 8 位数字加单位（H/M/S/m/u/n），无法解析时视为未设置。
pub fn grpc_timeout<T>(req: &Request<T>) -> Option<Duration> {
    let value = req.metadata().get("grpc-timeout")?.to_str().ok()?;
    if value.len() < 2 || value.len() > 9 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(amount * 60 * 60)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}

/// 为一次 gRPC 调用创建 span
pub fn create_request_span<T>(req: &Request<T>, name: &'static str) -> tracing::Span {
    info_span!(
        "grpc_request",
        method = name,
        trace_id = %trace_id_of(req)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_id_from_header() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert("x-request-id", "req-42".parse().unwrap());

        let req = tracing_interceptor(req).unwrap();
        assert_eq!(trace_id_of(&req), "req-42");
    }

    #[test]
    fn test_trace_header_priority() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert("x-correlation-id", "corr".parse().unwrap());
        req.metadata_mut()
            .insert("x-trace-id", "trace".parse().unwrap());

        let req = tracing_interceptor(req).unwrap();
        assert_eq!(trace_id_of(&req), "trace");
    }

    #[test]
    fn test_trace_id_generated_when_missing() {
        let req = tracing_interceptor(Request::new(())).unwrap();
        let trace_id = trace_id_of(&req);
        assert_ne!(trace_id, "unknown");
        assert!(Uuid::parse_str(trace_id).is_ok());
    }

    #[test]
    fn test_grpc_timeout_from_set_timeout() {
        let mut req = Request::new(());
        req.set_timeout(Duration::from_millis(100));
        assert_eq!(grpc_timeout(&req), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_grpc_timeout_units() {
        let cases = [
            ("2H", Duration::from_secs(7200)),
            ("3M", Duration::from_secs(180)),
            ("15S", Duration::from_secs(15)),
            ("250m", Duration::from_millis(250)),
            ("100000u", Duration::from_millis(100)),
            ("5n", Duration::from_nanos(5)),
        ];
        for (value, expected) in cases {
            let mut req = Request::new(());
            req.metadata_mut().insert("grpc-timeout", value.parse().unwrap());
            assert_eq!(grpc_timeout(&req), Some(expected), "{value}");
        }
    }

    #[test]
    fn test_grpc_timeout_missing_or_malformed() {
        assert_eq!(grpc_timeout(&Request::new(())), None);

        for value in ["", "S", "10x", "123456789S", "-1S"] {
            let mut req = Request::new(());
            req.metadata_mut().insert("grpc-timeout", value.parse().unwrap());
            assert_eq!(grpc_timeout(&req), None, "{value}");
        }
    }

    #[test]
    fn test_trace_id_unknown_without_interceptor() {
        let req = Request::new(());
        assert_eq!(trace_id_of(&req), "unknown");
    }
}
