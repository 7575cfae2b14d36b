//! 命令编排领域层（interactor-domain）
//!
//! 提供“可确认、可取消、可重试”的命令在领域层所需的最小构件：
//! - 实体（`entity`）与版本号值对象（`value_object`），支撑乐观并发；
//! - 操作类型与命令目标（`operation`）：删除、激活、停用、更新、切换；
//! - 请求生命周期状态机（`state`）与命令请求（`request`）；
//! - 仓储端口（`persist`）：由外部基础设施（SQL、HTTP、内存）实现；
//! - 统一错误（`error`），区分瞬时错误（连接失败）与终止错误。
//!
//! 本 crate 不包含任何调度或 I/O 逻辑；编排器、重试守卫与幂等追踪位于
//! `interactor-application`。
//!
pub mod entity;
pub mod error;
pub mod operation;
pub mod persist;
pub mod request;
pub mod state;
pub mod value_object;

// 允许在本 crate 内部通过 ::interactor_domain 进行自引用，
// 以便过程宏展开的路径在本 crate 内同样可以解析。
extern crate self as interactor_domain;
