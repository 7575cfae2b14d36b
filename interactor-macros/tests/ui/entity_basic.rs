use interactor_domain::entity::Entity;
use interactor_domain::value_object::Version;
use interactor_macros::entity;

#[entity(id = String)]
#[derive(Clone)]
struct Banner {
    title: String,
    active: bool,
}

// version 已存在时会被挪到最前，不会重复生成
#[entity(id = u64, debug = false)]
struct Menu {
    version: Version,
    items: Vec<String>,
}

fn main() {
    let mut banner = Banner::new("b-1".to_string(), Version::new());
    assert_eq!(banner.id(), "b-1");
    assert!(banner.version().is_new());
    assert!(!banner.active);
    assert!(banner.title.is_empty());

    banner.set_version(banner.version().next());
    assert_eq!(banner.clone().version().value(), 1);
    let _ = format!("{:?}", banner);

    let menu = Menu::new(7, Version::from_value(3));
    assert_eq!(*menu.id(), 7);
    assert_eq!(menu.version().value(), 3);
    assert!(menu.items.is_empty());
}
