//! Metrics 模块
//!
//! 提供 Prometheus metrics 导出

use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::{Duration, Instant};

use futures::Stream;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use storefront_adapter_postgres::PoolStatus;
use storefront_errors::{AppError, AppResult};
use tonic::{Code, Status};
use tracing::debug;

use crate::infrastructure::Infrastructure;

/// Metrics 记录器
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// 创建并安装全局 Prometheus 记录器（每个进程只能调用一次）
    pub fn new() -> AppResult<Self> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            AppError::internal(format!("Failed to install Prometheus recorder: {}", e))
        })?;
        Ok(Self { handle })
    }

    /// 创建不安装为全局记录器的实例
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    /// 获取 Prometheus 格式的 metrics
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 记录 gRPC 请求
pub fn record_grpc_request(service: &str, method: &str, status: &str, duration_ms: f64) {
    let labels = [
        ("service", service.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    counter!("grpc_requests_total", &labels).increment(1);
    histogram!("grpc_request_duration_ms", &labels).record(duration_ms);
}

/// 请求计时器
pub struct RequestTimer {
    start: Instant,
    service: &'static str,
    method: &'static str,
}

impl RequestTimer {
    pub fn new(service: &'static str, method: &'static str) -> Self {
        Self {
            start: Instant::now(),
            service,
            method,
        }
    }

    /// 结束计时，status 使用 gRPC 状态码名称
    pub fn finish(self, status: &str) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_grpc_request(self.service, self.method, status, duration);
    }
}

/// 流式响应计时
///
/// 流读完时记录 Ok，出现过错误时记录第一个错误的状态码，
/// 未读完就被丢弃时记录 Cancelled。
pub struct TimedStream<S> {
    inner: S,
    timer: Option<RequestTimer>,
    failed: Option<Code>,
}

impl<S> TimedStream<S> {
    pub fn new(inner: S, timer: RequestTimer) -> Self {
        Self {
            inner,
            timer: Some(timer),
            failed: None,
        }
    }

    fn finish(&mut self, outcome: &str) {
        if let Some(timer) = self.timer.take() {
            match self.failed {
                Some(code) => timer.finish(&format!("{:?}", code)),
                None => timer.finish(outcome),
            }
        }
    }
}

impl<S, T> Stream for TimedStream<S>
where
    S: Stream<Item = Result<T, Status>> + Unpin,
{
    type Item = Result<T, Status>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let item = ready!(Pin::new(&mut self.inner).poll_next(cx));
        match &item {
            Some(Ok(_)) => {}
            Some(Err(status)) => {
                self.failed.get_or_insert(status.code());
            }
            None => self.finish("Ok"),
        }
        Poll::Ready(item)
    }
}

impl<S> Drop for TimedStream<S> {
    fn drop(&mut self) {
        self.finish("Cancelled");
    }
}

/// 记录 PostgreSQL 连接池指标
pub fn record_postgres_pool_metrics(status: &PoolStatus) {
    gauge!("postgres_pool_size").set(status.size as f64);
    gauge!("postgres_pool_idle").set(status.idle as f64);
    gauge!("postgres_pool_active").set(status.active as f64);
    gauge!("postgres_pool_utilization").set(status.utilization());
}

/// 连接池 Metrics 采集器
pub struct PoolMetricsCollector {
    infra: Infrastructure,
    interval: Duration,
}

impl PoolMetricsCollector {
    pub fn new(infra: Infrastructure, interval: Duration) -> Self {
        Self { infra, interval }
    }

    /// 启动后台采集任务
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;

                let status = self.infra.postgres_pool_status();
                record_postgres_pool_metrics(&status);

                debug!(
                    size = status.size,
                    idle = status.idle,
                    active = status.active,
                    "Pool metrics collected"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use futures::executor::block_on;
    use metrics_exporter_prometheus::PrometheusRecorder;

    use super::*;

    /// 在局部记录器下读取流，返回渲染出的指标
    fn drain_with_recorder<F: FnOnce()>(f: F) -> String {
        let recorder: PrometheusRecorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, f);
        handle.render()
    }

    #[test]
    fn test_detached_recorder_renders() {
        let recorder = MetricsRecorder::detached();
        // 未安装为全局记录器，宏记录的指标不会出现在这里
        record_grpc_request("store", "GetOrderStatus", "Ok", 1.5);
        assert!(!recorder.render().contains("grpc_requests_total"));
    }

    #[test]
    fn test_request_timer_without_recorder() {
        let timer = RequestTimer::new("store", "AddToCart");
        timer.finish("NotFound");
        record_postgres_pool_metrics(&PoolStatus::default());
    }

    #[test]
    fn test_timed_stream_records_ok_at_end() {
        let rendered = drain_with_recorder(|| {
            let items = futures::stream::iter(vec![Ok::<_, Status>(1), Ok(2)]);
            let stream = TimedStream::new(items, RequestTimer::new("store", "SearchProducts"));
            let collected: Vec<_> = block_on(stream.collect());
            assert_eq!(collected.len(), 2);
        });
        assert!(rendered.contains(r#"method="SearchProducts""#));
        assert!(rendered.contains(r#"status="Ok""#));
    }

    #[test]
    fn test_timed_stream_records_mid_stream_error() {
        let rendered = drain_with_recorder(|| {
            let items = futures::stream::iter(vec![
                Ok(1),
                Err(Status::unavailable("connection reset")),
            ]);
            let stream = TimedStream::new(items, RequestTimer::new("store", "SearchProducts"));
            let _: Vec<_> = block_on(stream.collect());
        });
        assert!(rendered.contains(r#"status="Unavailable""#));
        assert!(!rendered.contains(r#"status="Ok""#));
    }

    #[test]
    fn test_timed_stream_dropped_early_is_cancelled() {
        let rendered = drain_with_recorder(|| {
            let items = futures::stream::iter(vec![Ok::<_, Status>(1), Ok(2), Ok(3)]);
            let mut stream = TimedStream::new(items, RequestTimer::new("store", "SearchProducts"));
            assert!(block_on(stream.next()).is_some());
        });
        assert!(rendered.contains(r#"status="Cancelled""#));
    }
}
