use cucumber::{given, then, when};
use schnitzeljagd_core::{RunProgress, ResultStore, DEFAULT_ORIGIN};
use schnitzeljagd_tests::HuntWorld;

// ===== Given Steps =====

#[given(expr = "{string} started a run")]
async fn started_run(world: &mut HuntWorld, name: String) {
    world
        .session
        .start(Some(&name))
        .await
        .expect("Run should start");
}

#[given("no run is active")]
async fn no_run(world: &mut HuntWorld) {
    assert!(!world.session.is_active());
}

// ===== When Steps =====

#[when(expr = "{int} seconds pass")]
async fn seconds_pass(world: &mut HuntWorld, secs: i64) {
    world.clock.advance_secs(secs);
}

#[when("the player completes the current challenge")]
async fn complete_current(world: &mut HuntWorld) {
    let progress = world
        .session
        .complete_challenge()
        .await
        .expect("Completing should succeed");
    world.last_progress = Some(progress);
}

#[when(expr = "the player completes {int} challenges in time")]
async fn complete_many(world: &mut HuntWorld, count: usize) {
    for _ in 0..count {
        complete_current(world).await;
    }
}

#[when("the player skips the current challenge")]
async fn skip_current(world: &mut HuntWorld) {
    let progress = world
        .session
        .skip_challenge()
        .await
        .expect("Skipping should succeed");
    world.last_progress = Some(progress);
}

#[when("the player aborts the run")]
async fn abort_run(world: &mut HuntWorld) {
    assert!(world.session.abort());
}

// ===== Then Steps =====

#[then(expr = "the run has {int} challenges")]
async fn run_has_challenges(world: &mut HuntWorld, count: usize) {
    assert_eq!(world.session.challenges().len(), count);
}

#[then("the run starts at the fallback origin")]
async fn starts_at_fallback(world: &mut HuntWorld) {
    let run = world.session.active_run().expect("No active run");
    assert!(run.origin_is_fallback());
    assert_eq!(run.origin(), DEFAULT_ORIGIN);
}

#[then(expr = "the current challenge is number {int}")]
async fn current_index(world: &mut HuntWorld, index: usize) {
    let run = world.session.active_run().expect("No active run");
    assert_eq!(run.current_index(), index);
}

#[then(expr = "the run finishes with {int} points")]
async fn finishes_with(world: &mut HuntWorld, points: u32) {
    match &world.last_progress {
        Some(RunProgress::Finished(result)) => assert_eq!(result.points, points),
        other => panic!("Expected a finished run, got {:?}", other),
    }
    assert!(!world.session.is_active());
}

#[then(expr = "the result has {int} schnitzel and {int} kartoffeln")]
async fn result_counts(world: &mut HuntWorld, schnitzel: u32, kartoffeln: u32) {
    let result = world.session.last_result().expect("No result");
    assert_eq!(result.schnitzel, schnitzel);
    assert_eq!(result.kartoffeln, kartoffeln);
}

#[then(expr = "the result is named {string}")]
async fn result_named(world: &mut HuntWorld, name: String) {
    let result = world.session.last_result().expect("No result");
    assert_eq!(result.name, name);
}

#[then(expr = "the store holds {int} run(s)")]
async fn store_holds(world: &mut HuntWorld, count: usize) {
    let runs = world.store.get_runs().await.expect("Store readable");
    assert_eq!(runs.len(), count);
}

#[then("nothing happened")]
async fn nothing_happened(world: &mut HuntWorld) {
    assert_eq!(world.last_progress, Some(RunProgress::Idle));
    assert!(world.session.last_result().is_none());
}

#[then("no run is active anymore")]
async fn no_run_anymore(world: &mut HuntWorld) {
    assert!(!world.session.is_active());
    assert!(world.session.current_challenge().is_none());
}
