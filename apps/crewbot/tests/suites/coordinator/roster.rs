//! Deaths, joins and leaves.

use crewbot::domain::roster::Role;
use crewbot::domain::voice_policy::VoiceState;
use crewbot::entities::games::GameState;
use crewbot::services::{ReconcileOutcome, VoiceEffect};
use crewbot::ErrorCode;

use crate::support::{playing_game, Harness, A, B, C, X};

#[tokio::test]
async fn death_moves_a_player_to_the_dead_roster() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut game = playing_game(&h).await;

    let report = game.player_died(B).await.expect("B dies");
    let stored = report.game.as_ref().unwrap();
    assert_eq!(stored.roster.alive(), vec![A, C]);
    assert_eq!(stored.roster.dead(), vec![B]);
    assert_eq!(stored.state, GameState::Playing);

    // The dead may talk among themselves while the round runs.
    assert!(matches!(
        report.voice,
        VoiceEffect::One {
            player_id: B,
            outcome: ReconcileOutcome::Applied(VoiceState::UNRESTRICTED)
        }
    ));
    assert_eq!(h.voice.current(A), Some(VoiceState::SILENCED));

    let (_, view) = h.panel.last().unwrap();
    assert_eq!(view.lists[1].players, vec![B]);
}

#[tokio::test]
async fn dying_twice_is_rejected_and_changes_nothing() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    game.player_died(A).await.unwrap();
    let version = game.snapshot().lock_version;

    let err = game.player_died(A).await.err().expect("second death fails");
    assert_eq!(err.code(), ErrorCode::InvalidRosterOperation);

    let stored = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(stored.roster.alive(), vec![B]);
    assert_eq!(stored.roster.dead(), vec![A]);
    assert_eq!(stored.lock_version, version);
}

#[tokio::test]
async fn only_alive_players_can_die() {
    let h = Harness::with_members(&[A]).await;
    let mut game = playing_game(&h).await;
    game.player_joined(X).await.unwrap();
    assert_eq!(game.snapshot().roster.role_of(X), Some(Role::Spectator));

    let err = game.player_died(X).await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidRosterOperation);

    let err = game.player_died(C).await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidRosterOperation);
    assert!(err.user_message().contains("not part of this game"));
}

#[tokio::test]
async fn deaths_need_a_running_game() {
    let h = Harness::with_members(&[A]).await;
    let mut game = h.create_game().await;

    let err = game.player_died(A).await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn deaths_are_recorded_during_meetings() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    game.start_meeting().await.unwrap();

    let report = game.player_died(A).await.expect("ejected in a meeting");
    let stored = report.game.unwrap();
    assert_eq!(stored.state, GameState::Meeting);
    assert_eq!(stored.roster.dead(), vec![A]);
    assert_eq!(h.voice.current(A), Some(VoiceState::MUTED));
}

#[tokio::test]
async fn newcomer_joins_as_spectator() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    let publishes = h.panel.publish_count();

    let report = game.player_joined(X).await.expect("X joins");
    let stored = report.game.as_ref().unwrap();
    assert_eq!(stored.roster.spectating(), vec![X]);
    assert_eq!(stored.roster.alive(), vec![A, B]);
    assert_eq!(h.voice.current(X), Some(VoiceState::MUTED));

    assert!(matches!(report.panel, Some(Ok(_))));
    assert_eq!(h.panel.publish_count(), publishes + 1);
    assert_eq!(h.panel.last().unwrap().1.lists[2].players, vec![X]);
}

#[tokio::test]
async fn returning_player_keeps_their_role() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    game.player_died(B).await.unwrap();
    game.start_meeting().await.unwrap();
    let version = game.snapshot().lock_version;
    let publishes = h.panel.publish_count();
    h.voice.clear();

    let report = game.player_joined(B).await.expect("B rejoins");
    let stored = report.game.as_ref().unwrap();
    assert_eq!(stored.roster.dead(), vec![B]);
    assert!(stored.roster.spectating().is_empty());
    assert_eq!(stored.lock_version, version);

    // Voice is restored for the rejoining player alone.
    assert_eq!(h.voice.updates().len(), 1);
    assert_eq!(h.voice.current(B), Some(VoiceState::MUTED));
    assert!(report.panel.is_none());
    assert_eq!(h.panel.publish_count(), publishes);
}

#[tokio::test]
async fn players_can_join_before_the_game_starts() {
    let h = Harness::with_members(&[A]).await;
    let mut game = h.create_game().await;

    game.player_joined(B).await.unwrap();
    let report = game.start_game().await.unwrap();
    assert_eq!(report.game.unwrap().roster.alive(), vec![A, B]);
}

#[tokio::test]
async fn leaving_keeps_the_roster_and_lifts_voice_restrictions() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut game = playing_game(&h).await;
    assert_eq!(h.voice.current(C), Some(VoiceState::SILENCED));
    let publishes = h.panel.publish_count();

    let report = game.player_left(C).await.expect("C leaves");
    assert_eq!(report.game.as_ref().unwrap().roster.alive(), vec![A, B, C]);
    assert_eq!(h.voice.current(C), Some(VoiceState::UNRESTRICTED));
    assert!(report.panel.is_none());
    assert_eq!(h.panel.publish_count(), publishes);

    // Back in voice, back under the round's rules.
    game.player_joined(C).await.unwrap();
    assert_eq!(h.voice.current(C), Some(VoiceState::SILENCED));
}

#[tokio::test]
async fn alive_players_reads_the_current_record() {
    let h = Harness::with_members(&[C, A, B]).await;
    let mut game = playing_game(&h).await;
    let mut other = h.coordinator().await.unwrap();

    assert_eq!(game.alive_players().await.unwrap(), vec![A, B, C]);
    other.player_died(A).await.unwrap();
    assert_eq!(game.alive_players().await.unwrap(), vec![B, C]);
}

#[tokio::test]
async fn untracked_member_leaving_is_ignored() {
    let h = Harness::with_members(&[A]).await;
    let mut game = playing_game(&h).await;
    h.voice.clear();

    let report = game.player_left(X).await.expect("leave is accepted");
    assert!(matches!(
        report.voice,
        VoiceEffect::One {
            player_id: X,
            outcome: ReconcileOutcome::Untracked
        }
    ));
    assert!(h.voice.updates().is_empty());
    assert_eq!(report.game.unwrap().roster.role_of(X), None);
}
