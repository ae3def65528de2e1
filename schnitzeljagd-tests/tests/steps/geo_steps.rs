use cucumber::{given, then};
use schnitzeljagd_core::GeoPoint;
use schnitzeljagd_tests::HuntWorld;

#[given(expr = "point {word} at {float}, {float}")]
async fn define_point(world: &mut HuntWorld, name: String, lat: f64, lng: f64) {
    world.points.insert(name, GeoPoint::new(lat, lng));
}

#[then(expr = "the distance from {word} to {word} equals the distance back")]
async fn symmetric(world: &mut HuntWorld, from: String, to: String) {
    let a = world.point(&from);
    let b = world.point(&to);
    assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
}

#[then(expr = "the distance from {word} to itself is zero")]
async fn zero_to_itself(world: &mut HuntWorld, name: String) {
    let a = world.point(&name);
    assert_eq!(a.distance_to(&a), 0.0);
}

#[then(expr = "the distance from {word} to {word} is between {float} and {float} meters")]
async fn distance_between(world: &mut HuntWorld, from: String, to: String, min: f64, max: f64) {
    let distance = world.point(&from).distance_to(&world.point(&to));
    assert!(
        (min..=max).contains(&distance),
        "distance {} m not in [{}, {}]",
        distance,
        min,
        max
    );
}
