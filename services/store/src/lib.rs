//! Store Service - 商品搜索、购物车与订单状态
//!
//! 分层：
//! - `domain`：商品/购物车/订单及仓储接口
//! - `application`：业务流程（StoreHandler）
//! - `infrastructure`：PostgreSQL 仓储与建表迁移
//! - `api`：gRPC 接口

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
