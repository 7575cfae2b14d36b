use interactor_macros::entity_id;
use uuid::Uuid;

#[entity_id]
struct TagId(String);

#[entity_id(debug = false)]
struct HeritageId(Uuid);

impl std::fmt::Debug for HeritageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HeritageId(..)")
    }
}

fn main() {
    let tag: TagId = "t-42".parse().unwrap();
    assert_eq!(tag.to_string(), "t-42");
    assert_eq!(tag.as_ref(), "t-42");
    assert_eq!(tag, TagId::from("t-42".to_string()));
    let raw: String = tag.clone().into();
    assert_eq!(raw, tag.into_inner());

    let heritage = HeritageId::new(Uuid::new_v4());
    let _ = format!("{:?}", heritage);
}
