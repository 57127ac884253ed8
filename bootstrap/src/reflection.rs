//! gRPC 反射服务

pub use tonic_reflection::server::v1::{ServerReflection, ServerReflectionServer};
use tonic_reflection::server::Builder;

use storefront_errors::{AppError, AppResult};

/// 构建包含指定文件描述符集的反射服务
pub fn build_reflection(
    file_descriptor_sets: Vec<&'static [u8]>,
) -> AppResult<ServerReflectionServer<impl ServerReflection>> {
    let builder = file_descriptor_sets
        .into_iter()
        .fold(Builder::configure(), |builder, fds| {
            builder.register_encoded_file_descriptor_set(fds)
        });
    builder
        .build_v1()
        .map_err(|e| AppError::internal(format!("Failed to build reflection service: {}", e)))
}
