use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use interactor_domain::entity::Entity;
use interactor_domain::error::{DomainError, DomainResult};
use interactor_domain::persist::Repository;

/// 基于内存的仓储实现
/// - 以实体 ID 为键存放最新快照
/// - `save` 做乐观并发检查：传入版本必须等于已存版本，成功后版本号加一
/// - 新实体（`Version::new()`）只能在键不存在时写入
pub struct InMemoryRepository<E: Entity> {
    rows: DashMap<E::Id, E>,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }
}

impl<E> InMemoryRepository<E>
where
    E: Entity + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入快照，不做版本检查（用于准备数据）
    pub fn insert(&self, entity: E) {
        self.rows.insert(entity.id().clone(), entity);
    }

    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.rows.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl<E> Repository<E> for InMemoryRepository<E>
where
    E: Entity + Clone + 'static,
{
    async fn find(&self, id: &E::Id) -> DomainResult<E> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found(format!("entity {id}")))
    }

    async fn save(&self, mut entity: E) -> DomainResult<E> {
        let expected = entity.version();

        match self.rows.entry(entity.id().clone()) {
            Entry::Occupied(mut slot) => {
                let actual = slot.get().version();
                if actual != expected {
                    return Err(DomainError::VersionConflict { expected, actual });
                }
                entity.set_version(expected.next());
                slot.insert(entity.clone());
            }
            Entry::Vacant(slot) => {
                if !expected.is_new() {
                    return Err(DomainError::not_found(format!("entity {}", entity.id())));
                }
                entity.set_version(expected.next());
                slot.insert(entity.clone());
            }
        }

        Ok(entity)
    }
}
