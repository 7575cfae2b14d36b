//! 幂等追踪（IdempotencyTracker）
//!
//! 以 `(实体类型, 操作类型, 目标标识)` 为逻辑键，保证同一时刻每个键最多只有一个请求
//! 处于已确认/执行中窗口。后到者立即失败，不排队。
//!
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use interactor_domain::request::{IdempotencyKey, RequestId};

#[derive(Debug, Default)]
pub struct IdempotencyTracker {
    in_flight: DashMap<IdempotencyKey, RequestId>,
}

impl IdempotencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用键；键已被占用时返回 `false`
    ///
    /// 检查与写入在同一个分片锁内完成。
    pub fn try_acquire(&self, key: &IdempotencyKey, holder: &RequestId) -> bool {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(holder.clone());
                true
            }
        }
    }

    /// 释放键，返回此前是否被占用
    pub fn release(&self, key: &IdempotencyKey) -> bool {
        self.in_flight.remove(key).is_some()
    }

    /// 作用域形式的占用：返回的守卫在 `release` 或析构时释放键，且只释放一次
    pub fn acquire(&self, key: IdempotencyKey, holder: RequestId) -> Option<IdempotencyGuard<'_>> {
        if !self.try_acquire(&key, &holder) {
            return None;
        }
        Some(IdempotencyGuard {
            tracker: self,
            key,
            holder,
            released: false,
        })
    }

    pub fn is_held(&self, key: &IdempotencyKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn holder(&self, key: &IdempotencyKey) -> Option<RequestId> {
        self.in_flight.get(key).map(|r| r.value().clone())
    }

    /// 当前处于执行窗口的键数量
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// 幂等锁守卫
#[must_use = "dropping the guard releases the key immediately"]
pub struct IdempotencyGuard<'a> {
    tracker: &'a IdempotencyTracker,
    key: IdempotencyKey,
    holder: RequestId,
    released: bool,
}

impl IdempotencyGuard<'_> {
    pub fn key(&self) -> &IdempotencyKey {
        &self.key
    }

    /// 显式释放
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        // 只移除自己持有的键
        self.tracker
            .in_flight
            .remove_if(&self.key, |_, holder| holder == &self.holder);
        tracing::debug!(key = %self.key, request_id = %self.holder, "idempotency key released");
    }
}

impl Drop for IdempotencyGuard<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}
