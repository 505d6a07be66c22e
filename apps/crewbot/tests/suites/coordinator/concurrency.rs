//! Several coordinators on one channel, as overlapping interactions would
//! produce.

use crewbot::domain::ids::PlayerId;
use crewbot::entities::games::GameState;
use crewbot::ErrorCode;
use serial_test::serial;

use crate::support::{playing_game, Harness, A, B, C, X};

#[tokio::test]
async fn stale_coordinators_decide_on_fresh_data() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut first = playing_game(&h).await;
    let mut second = h.coordinator().await.unwrap();

    first.player_died(A).await.unwrap();
    // `second` never saw A die, yet its write keeps that death.
    second.player_died(B).await.unwrap();

    let stored = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(stored.roster.alive(), vec![C]);
    assert_eq!(stored.roster.dead(), vec![A, B]);
}

#[tokio::test]
async fn the_same_death_is_recorded_once() {
    let h = Harness::with_members(&[A, B]).await;
    let mut first = playing_game(&h).await;
    let mut second = h.coordinator().await.unwrap();

    first.player_died(A).await.unwrap();
    let err = second.player_died(A).await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidRosterOperation);
}

#[tokio::test]
async fn double_start_from_two_coordinators_is_rejected() {
    let h = Harness::with_members(&[A]).await;
    let mut first = h.create_game().await;
    let mut second = h.coordinator().await.unwrap();

    first.start_game().await.unwrap();
    let err = second.start_game().await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    assert_eq!(second.snapshot().state, GameState::Created);
}

#[tokio::test]
async fn concurrent_joins_are_all_kept() {
    let h = Harness::with_members(&[A]).await;
    let mut first = playing_game(&h).await;
    let mut second = h.coordinator().await.unwrap();

    let (joined_b, joined_x) = tokio::join!(first.player_joined(B), second.player_joined(X));
    joined_b.unwrap();
    joined_x.unwrap();

    let stored = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(stored.roster.alive(), vec![A]);
    assert_eq!(stored.roster.spectating(), vec![B, X]);
}

#[tokio::test]
async fn every_write_bumps_the_lock_version() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = h.create_game().await;
    assert_eq!(game.snapshot().lock_version, 1);

    game.start_game().await.unwrap();
    let after_start = h.coordinator().await.unwrap().snapshot().lock_version;
    assert_eq!(after_start, 2);

    game.player_died(A).await.unwrap();
    let after_death = h.coordinator().await.unwrap().snapshot().lock_version;
    assert_eq!(after_death, 3);

    // Nothing to write: the version stays put.
    game.player_joined(A).await.unwrap();
    assert_eq!(
        h.coordinator().await.unwrap().snapshot().lock_version,
        after_death
    );
}

#[tokio::test]
#[serial]
async fn overlapping_operations_on_a_pooled_file_store_all_land() {
    let (h, _dir) = Harness::on_sqlite_file(&[A, B]).await;
    let mut first = playing_game(&h).await;
    let mut second = h.coordinator().await.unwrap();

    for round in 0..20u64 {
        let p = PlayerId(5_000 + 2 * round);
        let q = PlayerId(5_001 + 2 * round);
        let (joined_p, joined_q) = tokio::join!(first.player_joined(p), second.player_joined(q));
        joined_p.expect("first coordinator's join");
        joined_q.expect("second coordinator's join");
    }

    let (died_a, died_b) = tokio::join!(first.player_died(A), second.player_died(B));
    died_a.expect("A dies");
    died_b.expect("B dies");

    let stored = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(stored.roster.spectating().len(), 40);
    assert_eq!(stored.roster.dead(), vec![A, B]);
    assert!(stored.roster.alive().is_empty());
}
