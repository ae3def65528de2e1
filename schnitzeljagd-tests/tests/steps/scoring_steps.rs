use cucumber::{given, then};
use schnitzeljagd_core::Scoring;
use schnitzeljagd_tests::HuntWorld;

#[given(expr = "a scoring of {int} points per schnitzel and {int} per kartoffel")]
async fn custom_scoring(world: &mut HuntWorld, bonus: u32, malus: u32) {
    world.scoring = Some(Scoring {
        bonus_per_schnitzel: bonus,
        malus_per_kartoffel: malus,
    });
}

#[then(expr = "{int} schnitzel and {int} kartoffeln score {int} points")]
async fn scores(world: &mut HuntWorld, schnitzel: u32, kartoffeln: u32, points: u32) {
    let scoring = world.scoring.unwrap_or_default();
    assert_eq!(scoring.points(schnitzel, kartoffeln), points);
}
