//! 领域类型声明宏（interactor-macros）
//!
//! - `#[entity]`：为具名字段结构体补齐 `id`/`version` 字段并实现 `Entity`；
//! - `#[entity_id]`：把单字段 tuple struct 包装为标识类型；
//! - `#[value_object]`：合并值对象所需的派生。
//!
use proc_macro::TokenStream;

mod entity;
mod entity_id;
mod utils;
mod value_object;

/// 实体宏
/// - 追加字段：`id: IdType`, `version: Version`（若缺失）并置于字段最前
/// - 自动实现 `::interactor_domain::entity::Entity`（`new/id/version/set_version`）
/// - 参数：`#[entity(id = IdType, debug = true|false)]`，`id` 默认 `String`
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 标识宏：仅支持单字段 tuple struct，如 `struct BookmarkId(String);`
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 值对象宏：支持结构体与枚举，参数 `#[value_object(debug = true|false)]`
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
