//! 仓储端口（Repository）
//!
//! 编排器只依赖两个动作：按标识查找实体、保存实体。
//! - `find`：实体不存在时返回 `DomainError::NotFound`（终止错误）；
//! - `save`：远端不可达时返回 `DomainError::Connection`（瞬时错误，可重试），
//!   数据不合法返回 `Validation`，版本不一致返回 `VersionConflict`。
//!
use crate::entity::Entity;
use crate::error::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Repository<E>: Send + Sync
where
    E: Entity,
{
    async fn find(&self, id: &E::Id) -> DomainResult<E>;

    /// 保存实体并返回持久化后的版本（版本号由仓储推进）
    async fn save(&self, entity: E) -> DomainResult<E>;
}

#[async_trait]
impl<E, T> Repository<E> for Arc<T>
where
    E: Entity + 'static,
    T: Repository<E> + ?Sized,
{
    async fn find(&self, id: &E::Id) -> DomainResult<E> {
        (**self).find(id).await
    }

    async fn save(&self, entity: E) -> DomainResult<E> {
        (**self).save(entity).await
    }
}
