//! State machine transitions and record lifetime.

use crewbot::adapters::games_sea::GameUpdate;
use crewbot::domain::lifecycle::Operation;
use crewbot::domain::panel_view::{PanelAction, ENDED_TITLE};
use crewbot::domain::voice_policy::VoiceState;
use crewbot::entities::games::GameState;
use crewbot::repos::games;
use crewbot::services::VoiceEffect;
use crewbot::{ErrorCode, GameCoordinator};

use crate::support::{playing_game, Harness, A, B, C, CHANNEL, GUILD, PANEL};

#[tokio::test]
async fn create_seeds_voice_members_as_spectators() {
    let h = Harness::with_members(&[C, A, B]).await;
    let game = h.create_game().await;

    let snapshot = game.snapshot();
    assert_eq!(snapshot.state, GameState::Created);
    assert_eq!(snapshot.guild_id, GUILD);
    assert_eq!(snapshot.panel, PANEL);
    assert_eq!(snapshot.roster.spectating(), vec![A, B, C]);
    assert!(snapshot.roster.alive().is_empty());
    assert!(snapshot.roster.dead().is_empty());
    assert_eq!(snapshot.lock_version, 1);
}

#[tokio::test]
async fn missing_game_is_an_empty_lookup() {
    let h = Harness::new().await;
    assert!(h.coordinator().await.is_none());
}

#[tokio::test]
async fn second_game_in_a_channel_is_rejected() {
    let h = Harness::new().await;
    let _game = h.create_game().await;

    let err = GameCoordinator::create_game(&h.state.coordinators, CHANNEL, GUILD, PANEL)
        .await
        .err()
        .expect("duplicate game must fail");
    assert_eq!(err.code(), ErrorCode::GameExists);
}

#[tokio::test]
async fn start_game_promotes_every_spectator() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut game = h.create_game().await;

    let report = game.start_game().await.expect("start game");
    assert!(report.side_effects_ok());
    assert_eq!(report.operation, Operation::StartGame);

    let stored = report.game.expect("game still exists");
    assert_eq!(stored.state, GameState::Playing);
    assert_eq!(stored.roster.alive(), vec![A, B, C]);
    assert!(stored.roster.dead().is_empty());
    assert!(stored.roster.spectating().is_empty());

    for player in [A, B, C] {
        assert_eq!(h.voice.current(player), Some(VoiceState::SILENCED));
    }

    let (location, view) = h.panel.last().expect("panel refreshed");
    assert_eq!(location, PANEL);
    assert_eq!(view.title, "Among Us in <#1000>");
    assert_eq!(
        view.actions(),
        vec![
            PanelAction::MeetingStarted,
            PanelAction::PlayerDied,
            PanelAction::GameEnded
        ]
    );
}

#[tokio::test]
async fn start_game_while_playing_is_rejected_without_changes() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    let before = h.coordinator().await.unwrap().snapshot().clone();
    let publishes = h.panel.publish_count();

    let err = game.start_game().await.err().expect("second start fails");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);

    let after = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(after.state, GameState::Playing);
    assert_eq!(after.roster, before.roster);
    assert_eq!(after.lock_version, before.lock_version);
    assert_eq!(h.panel.publish_count(), publishes);
}

#[tokio::test]
async fn meeting_round_trip_leaves_rosters_alone() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut game = playing_game(&h).await;
    game.player_died(C).await.expect("C dies");
    let roster_before = game.snapshot().roster.clone();

    let report = game.start_meeting().await.expect("start meeting");
    assert_eq!(report.game.as_ref().unwrap().state, GameState::Meeting);
    assert_eq!(h.voice.current(A), Some(VoiceState::UNRESTRICTED));
    assert_eq!(h.voice.current(C), Some(VoiceState::MUTED));
    assert_eq!(
        h.panel.last().unwrap().1.actions(),
        vec![
            PanelAction::MeetingEnded,
            PanelAction::PlayerDied,
            PanelAction::GameEnded
        ]
    );

    let report = game.end_meeting().await.expect("end meeting");
    let stored = report.game.unwrap();
    assert_eq!(stored.state, GameState::Playing);
    assert_eq!(stored.roster, roster_before);
    assert_eq!(h.voice.current(A), Some(VoiceState::SILENCED));
    assert_eq!(h.voice.current(C), Some(VoiceState::UNRESTRICTED));
}

#[tokio::test]
async fn meetings_need_a_running_round() {
    let h = Harness::new().await;
    let mut game = h.create_game().await;

    let err = game.start_meeting().await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    let err = game.end_meeting().await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);

    game.start_game().await.unwrap();
    let err = game.end_meeting().await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn end_game_releases_voice_renders_final_panel_and_deletes() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut game = playing_game(&h).await;
    game.player_died(B).await.unwrap();
    game.start_meeting().await.unwrap();

    let report = game.end_game().await.expect("end game");
    assert!(report.game.is_none());
    assert!(report.side_effects_ok());
    match &report.voice {
        VoiceEffect::All(voice) => assert_eq!(voice.applied.len(), 3),
        other => panic!("expected full reconciliation, got {other:?}"),
    }

    for player in [A, B, C] {
        assert_eq!(h.voice.current(player), Some(VoiceState::UNRESTRICTED));
    }

    let (_, view) = h.panel.last().unwrap();
    assert_eq!(view.title, ENDED_TITLE);
    assert!(view.rows.is_empty());

    assert!(h.coordinator().await.is_none());
}

#[tokio::test]
async fn a_created_game_can_be_ended() {
    let h = Harness::with_members(&[A]).await;
    let game = h.create_game().await;

    game.end_game().await.expect("end created game");
    assert!(h.coordinator().await.is_none());

    // The channel is free again.
    let again = h.create_game().await;
    assert_eq!(again.snapshot().state, GameState::Created);
}

#[tokio::test]
async fn operations_on_an_ended_game_are_invalid_transitions() {
    let h = Harness::with_members(&[A, B]).await;
    let game = playing_game(&h).await;
    let mut stale = h.coordinator().await.unwrap();

    game.end_game().await.unwrap();

    let err = stale.start_meeting().await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    let err = stale.player_died(A).await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);

    let stale = h.coordinator().await;
    assert!(stale.is_none());
}

/// Commit `ended` without deleting the row, as an `end_game` cut short after
/// its first write would.
async fn leave_ended_record(h: &Harness) {
    let current = games::require_game(h.state.db(), CHANNEL).await.unwrap();
    games::update(
        h.state.db(),
        GameUpdate::new(CHANNEL, current.lock_version).with_state(GameState::Ended),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn leftover_ended_record_can_be_ended_again() {
    let h = Harness::with_members(&[A, B]).await;
    let _game = playing_game(&h).await;
    leave_ended_record(&h).await;

    let leftover = h.coordinator().await.expect("ended row still stored");
    assert_eq!(leftover.snapshot().state, GameState::Ended);

    let report = leftover.end_game().await.expect("finish ending");
    assert!(report.game.is_none());
    for player in [A, B] {
        assert_eq!(h.voice.current(player), Some(VoiceState::UNRESTRICTED));
    }
    assert_eq!(h.panel.last().unwrap().1.title, ENDED_TITLE);
    assert!(h.coordinator().await.is_none());
}

#[tokio::test]
async fn create_game_clears_a_leftover_ended_record() {
    let h = Harness::with_members(&[A, B]).await;
    let _game = playing_game(&h).await;
    leave_ended_record(&h).await;

    let fresh = h.create_game().await;
    let snapshot = fresh.snapshot();
    assert_eq!(snapshot.state, GameState::Created);
    assert_eq!(snapshot.roster.spectating(), vec![A, B]);
    assert!(snapshot.roster.alive().is_empty());
    assert_eq!(snapshot.lock_version, 1);
}
