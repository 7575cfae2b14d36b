use interactor_macros::value_object;

#[value_object]
struct Coordinates {
    lat: i64,
    lon: i64,
}

#[value_object]
enum Visibility {
    #[default]
    Public,
    Hidden,
}

fn main() {
    let a = Coordinates { lat: 1, lon: 2 };
    assert_eq!(a.clone(), a);
    assert_eq!(Coordinates::default(), Coordinates { lat: 0, lon: 0 });
    assert_ne!(Visibility::default(), Visibility::Hidden);
}
