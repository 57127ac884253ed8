//! 数据库错误映射工具
//!
//! 按 SQLSTATE 把 sqlx 错误归类为 AppError

use storefront_errors::AppError;

/// 违反唯一约束
pub const UNIQUE_VIOLATION: &str = "23505";
/// 违反外键约束
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
/// 违反 CHECK 约束
pub const CHECK_VIOLATION: &str = "23514";
/// 数值超出范围（如 INTEGER 溢出）
pub const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
/// 语句被取消
pub const QUERY_CANCELED: &str = "57014";

/// 判断错误是否带有指定的 SQLSTATE
pub fn has_sqlstate(e: &sqlx::Error, code: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|c| c == code),
        _ => false,
    }
}

/// 将 SQLx 错误转换为 AppError，区分不同错误类型
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => {
            let Some(code) = db_err.code() else {
                return AppError::database(db_err.to_string());
            };
            match code.as_ref() {
                UNIQUE_VIOLATION => AppError::conflict("Duplicate entry violates unique constraint"),
                FOREIGN_KEY_VIOLATION => AppError::validation("Foreign key constraint violation"),
                CHECK_VIOLATION => AppError::validation("Check constraint violation"),
                "23502" => AppError::validation("Not null constraint violation"),
                NUMERIC_VALUE_OUT_OF_RANGE => AppError::validation("Numeric value out of range"),
                "22001" => AppError::validation("String data too long"),
                "22P02" => AppError::validation("Invalid input syntax"),
                QUERY_CANCELED => AppError::cancelled("Statement cancelled"),
                // 序列化失败 / 死锁 / 数据库正在关闭
                "40001" | "40P01" | "57P01" | "57P02" | "57P03" => {
                    AppError::unavailable(format!("Database temporarily unavailable ({}): {}", code, db_err))
                }
                _ => AppError::database(format!("Database error ({}): {}", code, db_err)),
            }
        }
        sqlx::Error::PoolTimedOut => AppError::unavailable("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::unavailable("Database connection pool is closed"),
        sqlx::Error::Io(io) => AppError::unavailable(format!("Database I/O error: {}", io)),
        sqlx::Error::Tls(tls) => AppError::unavailable(format!("Database TLS error: {}", tls)),
        sqlx::Error::Protocol(msg) => AppError::internal(format!("Database protocol error: {}", msg)),
        _ => AppError::database(e.to_string()),
    }
}
