//! gRPC 生成代码引入

pub mod store {
    tonic::include_proto!("store.v1");
}

/// 文件描述符集（用于 gRPC 反射）
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("store_descriptor");
