//! 持久化端口（persist）
//!
//! 仅定义仓储接口；具体实现（SQL、HTTP、内存）由基础设施层提供。
//!
mod repository;

pub use repository::Repository;
