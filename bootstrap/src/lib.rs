//! storefront-bootstrap - 统一服务启动骨架
//!
//! 配置加载、日志、连接池、健康检查、metrics 与 gRPC 服务器的启动/关闭

mod health;
mod infrastructure;
mod interceptor;
mod metrics;
mod reflection;
mod runtime;
mod starter;

pub use health::*;
pub use infrastructure::*;
pub use interceptor::*;
pub use self::metrics::*;
pub use reflection::*;
pub use runtime::*;
pub use starter::*;
