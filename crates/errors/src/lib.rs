//! storefront-errors - 统一错误处理
//!
//! 所有层都返回 `AppResult`，在 gRPC 边界统一转换为 `tonic::Status`。

use std::fmt::Display;

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn deadline_exceeded(msg: impl Into<String>) -> Self {
        Self::DeadlineExceeded(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 在错误信息前附加操作上下文，保持错误类别不变
    ///
    /// ```ignore
    /// repo.find_cart(user_id)
    ///     .await
    ///     .map_err(|e| e.context(format!("AddToCart(user_id={user_id})")))?;
    /// ```
    pub fn context(self, ctx: impl Display) -> Self {
        match self {
            Self::NotFound(m) => Self::NotFound(format!("{ctx}: {m}")),
            Self::Validation(m) => Self::Validation(format!("{ctx}: {m}")),
            Self::Conflict(m) => Self::Conflict(format!("{ctx}: {m}")),
            Self::Unavailable(m) => Self::Unavailable(format!("{ctx}: {m}")),
            Self::Cancelled(m) => Self::Cancelled(format!("{ctx}: {m}")),
            Self::DeadlineExceeded(m) => Self::DeadlineExceeded(format!("{ctx}: {m}")),
            Self::Database(m) => Self::Database(format!("{ctx}: {m}")),
            Self::Internal(m) => Self::Internal(format!("{ctx}: {m}")),
        }
    }

    /// 转换为 gRPC 状态码
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            Self::NotFound(_) => tonic::Code::NotFound,
            Self::Validation(_) => tonic::Code::InvalidArgument,
            Self::Conflict(_) => tonic::Code::AlreadyExists,
            Self::Unavailable(_) => tonic::Code::Unavailable,
            Self::Cancelled(_) => tonic::Code::Cancelled,
            Self::DeadlineExceeded(_) => tonic::Code::DeadlineExceeded,
            Self::Database(_) => tonic::Code::Internal,
            Self::Internal(_) => tonic::Code::Internal,
        }
    }

    /// 是否属于调用方请求本身的问题
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Validation(_) | Self::Conflict(_)
        )
    }
}

impl From<AppError> for tonic::Status {
    fn from(err: AppError) -> Self {
        tonic::Status::new(err.grpc_code(), err.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
