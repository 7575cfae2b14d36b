//! 操作类型与命令目标
//!
//! `OperationKind` 枚举编排器支持的状态变更；`CommandTarget` 由具体领域实体实现，
//! 负责在内存中应用一次操作并给出业务规则错误。
//!
use crate::entity::Entity;
use crate::error::DomainResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Delete,
    Activate,
    Deactivate,
    Update,
    Toggle,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Delete,
        OperationKind::Activate,
        OperationKind::Deactivate,
        OperationKind::Update,
        OperationKind::Toggle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Delete => "delete",
            OperationKind::Activate => "activate",
            OperationKind::Deactivate => "deactivate",
            OperationKind::Update => "update",
            OperationKind::Toggle => "toggle",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 命令目标：可被编排器操作的领域实体
///
/// - `TYPE`：实体类型的稳定名称，参与幂等键与日志；
/// - `Payload`：操作附带的数据（如更新后的字段），对编排器不透明；
/// - `apply`：在内存中应用操作。返回的错误为终止错误，不会被重试。
pub trait CommandTarget: Entity {
    const TYPE: &'static str;

    type Payload: Send + Sync;

    fn apply(&mut self, kind: OperationKind, payload: &Self::Payload) -> DomainResult<()>;
}
