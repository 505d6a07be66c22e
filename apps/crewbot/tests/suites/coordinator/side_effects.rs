//! Voice and panel failures are reported, never undone.

use crewbot::domain::ids::{ChannelId, MessageId, PanelLocation};
use crewbot::domain::panel_view::ENDED_TITLE;
use crewbot::domain::voice_policy::VoiceState;
use crewbot::entities::games::GameState;
use crewbot::services::{
    GatewayError, PanelOutcome, PanelRefreshError, ReconcileOutcome, VoiceEffect,
};
use crewbot::GameCoordinator;

use crate::support::{playing_game, Harness, A, B, C, CHANNEL, GUILD, PANEL, X};

const MOVED: PanelLocation = PanelLocation {
    channel_id: ChannelId(2_001),
    message_id: MessageId(3_001),
};

#[tokio::test]
async fn one_voice_failure_does_not_block_the_rest() {
    let h = Harness::with_members(&[A, B, C]).await;
    h.voice.fail_for(B, GatewayError::MemberNotInVoice(B));
    let mut game = h.create_game().await;

    let report = game.start_game().await.expect("record write stands");
    assert_eq!(report.game.as_ref().unwrap().state, GameState::Playing);
    assert!(!report.side_effects_ok());

    let VoiceEffect::All(voice) = &report.voice else {
        panic!("expected full reconciliation, got {:?}", report.voice);
    };
    assert_eq!(voice.failed_players(), vec![B]);
    assert_eq!(
        voice.applied,
        vec![(A, VoiceState::SILENCED), (C, VoiceState::SILENCED)]
    );

    let problems = report.problems();
    assert_eq!(problems.len(), 1);
    assert!(problems[0].contains("<@102>"));

    // The record is authoritative; the next reconciliation catches B up.
    h.voice.heal(B);
    game.start_meeting().await.unwrap();
    assert_eq!(h.voice.current(B), Some(VoiceState::UNRESTRICTED));
}

#[tokio::test]
async fn single_player_voice_failure_is_reported() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    h.voice
        .fail_for(A, GatewayError::MissingPermission("MUTE_MEMBERS".into()));

    let report = game.player_died(A).await.expect("death is recorded");
    assert_eq!(report.game.as_ref().unwrap().roster.dead(), vec![A]);
    assert!(matches!(
        report.voice,
        VoiceEffect::One {
            player_id: A,
            outcome: ReconcileOutcome::Failed(GatewayError::MissingPermission(_))
        }
    ));
    assert_eq!(report.problems().len(), 1);
}

#[tokio::test]
async fn missing_panel_message_is_reported_and_the_transition_stands() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    h.panel
        .fail_with(GatewayError::MessageNotFound(PANEL.message_id));

    let report = game.start_meeting().await.expect("meeting starts anyway");
    assert!(matches!(
        report.panel,
        Some(Err(PanelRefreshError::Gateway(
            GatewayError::MessageNotFound(MessageId(3_000))
        )))
    ));
    assert!(report.voice.is_clean());
    assert!(!report.side_effects_ok());

    let stored = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(stored.state, GameState::Meeting);
    assert_eq!(stored.panel, PANEL);

    h.panel.recover();
    assert_eq!(game.refresh_panel().await.unwrap(), PanelOutcome::Updated);
    assert_eq!(h.panel.last().unwrap().0, PANEL);
}

#[tokio::test]
async fn relocated_panel_is_remembered() {
    let h = Harness::with_members(&[A]).await;
    let mut game = h.create_game().await;
    h.panel.relocate_next(MOVED);

    let report = game.start_game().await.unwrap();
    assert!(matches!(report.panel, Some(Ok(PanelOutcome::Relocated(MOVED)))));

    let stored = h.coordinator().await.unwrap().snapshot().clone();
    assert_eq!(stored.panel, MOVED);

    // The next refresh edits the new message.
    game.start_meeting().await.unwrap();
    assert_eq!(h.panel.last().unwrap().0, MOVED);
}

#[tokio::test]
async fn relocate_panel_persists_and_publishes_there() {
    let h = Harness::with_members(&[A, B]).await;
    let mut game = playing_game(&h).await;
    h.voice.clear();

    let report = game.relocate_panel(MOVED).await.expect("relocate");
    assert!(matches!(report.voice, VoiceEffect::Skipped));
    assert_eq!(report.game.as_ref().unwrap().panel, MOVED);
    assert_eq!(report.game.as_ref().unwrap().state, GameState::Playing);
    assert!(matches!(report.panel, Some(Ok(PanelOutcome::Updated))));
    assert!(h.voice.updates().is_empty());

    let (location, view) = h.panel.last().unwrap();
    assert_eq!(location, MOVED);
    assert_eq!(view.lists[0].players, vec![A, B]);
}

#[tokio::test]
async fn end_game_deletes_even_when_side_effects_fail() {
    let h = Harness::with_members(&[A, B]).await;
    let game = playing_game(&h).await;
    h.voice.fail_for(A, GatewayError::MemberNotInVoice(A));
    h.panel
        .fail_with(GatewayError::ChannelNotFound(PANEL.channel_id));

    let report = game.end_game().await.expect("end game");
    assert!(report.game.is_none());
    assert_eq!(report.problems().len(), 2);
    assert_eq!(h.voice.current(B), Some(VoiceState::UNRESTRICTED));
    assert!(h.coordinator().await.is_none());
}

#[tokio::test]
async fn ended_panel_is_published_before_the_record_goes() {
    let h = Harness::with_members(&[A]).await;
    let game = playing_game(&h).await;
    let publishes = h.panel.publish_count();

    game.end_game().await.unwrap();

    let published = h.panel.published();
    assert_eq!(published.len(), publishes + 1);
    let (location, view) = published.last().unwrap();
    assert_eq!(*location, PANEL);
    assert_eq!(view.title, ENDED_TITLE);
}

#[tokio::test]
async fn unlistable_voice_channel_starts_an_empty_game() {
    let h = Harness::with_members(&[A, B]).await;
    h.voice
        .fail_listing(GatewayError::ChannelNotFound(CHANNEL));

    let game = GameCoordinator::create_game(&h.state.coordinators, CHANNEL, GUILD, PANEL)
        .await
        .expect("create game");
    assert!(game.snapshot().roster.is_empty());
}

#[tokio::test]
async fn untracked_players_are_left_alone() {
    let h = Harness::with_members(&[A]).await;
    let game = playing_game(&h).await;
    h.voice.clear();

    let outcome = h
        .state
        .coordinators
        .reconciler
        .reconcile_one(game.snapshot(), X)
        .await;
    assert!(matches!(outcome, ReconcileOutcome::Untracked));
    assert!(h.voice.updates().is_empty());
}

#[tokio::test]
async fn every_update_targets_the_game_guild() {
    let h = Harness::with_members(&[A, B, C]).await;
    let mut game = playing_game(&h).await;
    game.start_meeting().await.unwrap();

    let updates = h.voice.updates();
    assert_eq!(updates.len(), 6);
    assert!(updates.iter().all(|(guild, _, _)| *guild == GUILD));
}
