use cucumber::{given, then, when};
use schnitzeljagd_core::traits::NetworkStatus;
use schnitzeljagd_core::domain::geo::EARTH_RADIUS_M;
use schnitzeljagd_core::{
    CapabilityEvent, Challenge, ChallengeConfig, ChallengeVerifier, GeoPoint,
};
use schnitzeljagd_tests::HuntWorld;

fn verifier_for(config: ChallengeConfig) -> ChallengeVerifier {
    let challenge = Challenge::new(config, "Test", "Test challenge", "Check", 120);
    ChallengeVerifier::with_seed(&challenge, 1)
}

fn feed(world: &mut HuntWorld, event: CapabilityEvent) {
    if let CapabilityEvent::Position(Ok(fix)) = &event {
        world.route.push(*fix);
    }
    world.verifier().handle(event);
    world.events_fed += 1;
    if world.done_after.is_none() && world.verifier().is_done() {
        world.done_after = Some(world.events_fed);
    }
}

// ===== Given Steps =====

#[given("a wifi challenge")]
async fn wifi_challenge(world: &mut HuntWorld) {
    world.verifier = Some(verifier_for(ChallengeConfig::WifiToggle));
}

#[given(expr = "a distance challenge of {int} meters starting at {float}, {float}")]
async fn distance_challenge(world: &mut HuntWorld, goal_m: u32, lat: f64, lng: f64) {
    world.verifier = Some(verifier_for(ChallengeConfig::Distance { goal_m }));

    let start = GeoPoint::new(lat, lng);
    world.position = Some(start);
    feed(world, CapabilityEvent::Position(Ok(start)));
}

#[given(expr = "a distance challenge of {int} meters")]
async fn distance_challenge_without_fix(world: &mut HuntWorld, goal_m: u32) {
    world.verifier = Some(verifier_for(ChallengeConfig::Distance { goal_m }));
}

// ===== When Steps =====

#[when(expr = "the device reports a fix at {float}, {float}")]
async fn fix_at(world: &mut HuntWorld, lat: f64, lng: f64) {
    let fix = GeoPoint::new(lat, lng);
    world.position = Some(fix);
    feed(world, CapabilityEvent::Position(Ok(fix)));
}

#[when(expr = "the network reports {word}")]
async fn network_reports(world: &mut HuntWorld, state: String) {
    let status = match state.as_str() {
        "connected" => NetworkStatus::connected(),
        "disconnected" => NetworkStatus::disconnected(),
        other => panic!("Unknown network state '{}'", other),
    };
    feed(world, CapabilityEvent::Network(Ok(status)));
}

#[when(expr = "the player walks {float} meters {word}")]
async fn walk(world: &mut HuntWorld, meters: f64, direction: String) {
    let from = world.position.expect("No position yet");
    let degrees = (meters / EARTH_RADIUS_M).to_degrees();
    let to = match direction.as_str() {
        "north" => GeoPoint::new(from.lat + degrees, from.lng),
        "south" => GeoPoint::new(from.lat - degrees, from.lng),
        other => panic!("Unknown direction '{}'", other),
    };

    world.position = Some(to);
    feed(world, CapabilityEvent::Position(Ok(to)));
}

// ===== Then Steps =====

#[then(expr = "the challenge is done after event {int}")]
async fn done_after(world: &mut HuntWorld, event: usize) {
    assert_eq!(world.done_after, Some(event));
}

#[then("the challenge is not done")]
async fn not_done(world: &mut HuntWorld) {
    assert!(!world.verifier().is_done());
}

#[then("the challenge is done")]
async fn is_done(world: &mut HuntWorld) {
    assert!(world.verifier().is_done());
}

#[then(expr = "about {float} meters were walked")]
async fn walked(world: &mut HuntWorld, meters: f64) {
    let walked = world.verifier().walked_m().expect("Not a distance challenge");
    assert!(
        (walked - meters).abs() < 0.5,
        "walked {} m, expected about {} m",
        walked,
        meters
    );
}

#[then("the walked distance is the sum of the segments between the fixes")]
async fn walked_is_segment_sum(world: &mut HuntWorld) {
    let expected: f64 = world
        .route
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum();
    let walked = world.verifier().walked_m().expect("Not a distance challenge");
    assert!(
        (walked - expected).abs() < 1e-6,
        "walked {} m, segments sum to {} m",
        walked,
        expected
    );
}
