mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use roundtable_application::SchedulerHandle;
use roundtable_core::Roundtable;
use roundtable_core::backend::ModelBackend;
use roundtable_core::discussion::{DiscussionMode, DiscussionRepository, RoundtableEvent};
use roundtable_core::participant::Participant;
use roundtable_core::phase::Phase;
use roundtable_core::role::RoleLabel;
use roundtable_interaction::ResponseGenerator;

async fn spawn(
    mode: DiscussionMode,
    roster: Vec<Participant>,
    backend: Arc<dyn ModelBackend>,
) -> (SchedulerHandle, Arc<MockDiscussionRepository>) {
    let config = test_config();
    let repository = Arc::new(MockDiscussionRepository::default());
    let discussion = discussion(mode, roster);
    repository.save(&discussion).await.unwrap();

    let mut table = Roundtable::new(discussion);
    let opening = table.open().unwrap();
    repository.append_turn(table.id(), &opening).await.unwrap();

    let generator = Arc::new(ResponseGenerator::from_config(backend, &config));
    let handle = SchedulerHandle::spawn(table, generator, repository.clone(), config.scheduler);
    (handle, repository)
}

fn is_phase_change_to(event: &RoundtableEvent, phase: Phase) -> bool {
    matches!(event, RoundtableEvent::PhaseChanged { change } if change.to == phase)
}

#[tokio::test(start_paused = true)]
async fn test_round_robin_then_debate_with_mixed_roster() {
    let backend = ScriptedBackend::instant();
    let (handle, _) = spawn(
        DiscussionMode::Chat,
        vec![scripted("a"), generative("b")],
        backend.clone(),
    )
    .await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();

    let first = next_participant_turn(&mut events).await;
    let second = next_participant_turn(&mut events).await;
    assert_eq!(first.speaker.participant_id(), Some("a"));
    assert_eq!(first.role, Some(RoleLabel::Opening));
    assert_eq!(first.text, "a says X");
    assert_eq!(second.speaker.participant_id(), Some("b"));
    assert_eq!(second.text, "reply 1");

    next_event(&mut events, |e| is_phase_change_to(e, Phase::Debate)).await;
    handle.stop().await.unwrap();

    let turns = handle.turns().await.unwrap();
    let speakers: Vec<_> = turns
        .iter()
        .filter_map(|t| t.speaker.participant_id())
        .collect();
    assert_eq!(speakers[..2], ["a", "b"]);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_nothing_happens_before_start() {
    let (handle, _) = spawn(DiscussionMode::Chat, vec![scripted("a")], ScriptedBackend::instant()).await;

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(handle.turns().await.unwrap().len(), 1);
    let status = handle.status();
    assert!(!status.running);
    assert_eq!(status.phase, Phase::Intro);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_mention_forces_next_speaker_once() {
    let (handle, _) = spawn(
        DiscussionMode::Chat,
        vec![scripted("a"), scripted("b"), scripted("c")],
        ScriptedBackend::instant(),
    )
    .await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    next_event(&mut events, |e| is_phase_change_to(e, Phase::Debate)).await;

    let outcome = handle
        .send_user("@C what do you make of it?")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.forced_speaker.as_deref(), Some("c"));

    next_event(&mut events, |e| {
        matches!(e, RoundtableEvent::TurnAppended { turn } if turn.speaker.is_user())
    })
    .await;
    let forced = next_participant_turn(&mut events).await;
    assert_eq!(forced.speaker.participant_id(), Some("c"));
    assert_eq!(forced.role, Some(RoleLabel::Debate));
    assert!(forced.sidebar);

    let after = next_participant_turn(&mut events).await;
    assert!(!after.sidebar);
    assert_ne!(after.speaker.participant_id(), Some("c"));
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_user_send_during_round_robin_jumps_to_debate() {
    let (handle, _) = spawn(
        DiscussionMode::Brainstorm,
        vec![scripted("a"), scripted("b")],
        ScriptedBackend::instant(),
    )
    .await;
    handle.start().await.unwrap();

    let outcome = handle.send_user("Let me start").await.unwrap().unwrap();

    let change = outcome.phase_change.unwrap();
    assert_eq!((change.from, change.to), (Phase::Intro, Phase::Debate));
    assert!(handle.send_user("   ").await.unwrap().is_none());
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_pipeline() {
    let (handle, repository) = spawn(
        DiscussionMode::Opinion,
        vec![scripted("a"), scripted("b")],
        ScriptedBackend::instant(),
    )
    .await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    next_event(&mut events, |e| is_phase_change_to(e, Phase::Rationalist)).await;

    let outcome = handle.reset().await.unwrap();
    handle.stop().await.unwrap();

    assert_eq!(outcome.phase, Phase::Pioneer);
    assert_eq!(outcome.epoch, 1);
    let turns = handle.turns().await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0], outcome.opening);
    let status = handle.status();
    assert_eq!(status.phase, Phase::Pioneer);
    assert_eq!(status.turn_count, 1);

    handle.shutdown().await;
    let stored = repository.stored(handle.discussion_id()).unwrap();
    assert_eq!(stored.turns, turns);
}

#[tokio::test(start_paused = true)]
async fn test_stale_generation_is_dropped_after_reset() {
    let backend = ScriptedBackend::gated();
    let (handle, _) = spawn(DiscussionMode::Chat, vec![generative("g")], backend.clone()).await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    next_event(&mut events, |e| matches!(e, RoundtableEvent::ThinkingStarted { .. })).await;

    let outcome = handle.reset().await.unwrap();
    handle.stop().await.unwrap();
    backend.release();
    tokio::time::sleep(Duration::from_secs(5)).await;

    let turns = handle.turns().await.unwrap();
    assert_eq!(turns, vec![outcome.opening]);
    assert!(!handle.status().busy);
    assert_eq!(backend.calls(), 1);

    // the dropped result must not clear a thinking indicator
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(
        !seen.iter().any(|e| matches!(e, RoundtableEvent::ThinkingFinished { .. })),
        "unexpected events: {seen:?}"
    );
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_at_most_one_generation_in_flight() {
    let backend = ScriptedBackend::gated();
    let (handle, _) = spawn(DiscussionMode::Chat, vec![generative("g")], backend.clone()).await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    next_event(&mut events, |e| matches!(e, RoundtableEvent::ThinkingStarted { .. })).await;

    // the settle tick after this lands while the generation is pending
    handle.send_user("hurry up").await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(backend.calls(), 1);
    assert!(handle.status().busy);

    backend.release();
    let turn = next_participant_turn(&mut events).await;
    assert_eq!(turn.text, "reply 1");
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_opinion_pipeline_halts_at_summary() {
    let (handle, _) = spawn(
        DiscussionMode::Opinion,
        vec![scripted("a"), scripted("b")],
        ScriptedBackend::instant(),
    )
    .await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();

    let halted = next_event(&mut events, |e| matches!(e, RoundtableEvent::Halted { .. })).await;
    assert_eq!(halted, RoundtableEvent::Halted { phase: Phase::Summary });
    let turns = handle.turns().await.unwrap();
    let roles: Vec<_> = turns.iter().filter_map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            RoleLabel::Pioneer,
            RoleLabel::Rationalist,
            RoleLabel::Realist,
            RoleLabel::Converger,
            RoleLabel::Statement,
            RoleLabel::Statement,
        ]
    );
    assert!(!handle.status().running);

    // a mention still gets its one answer
    handle.send_user("@a anything to add?").await.unwrap();
    let answer = next_participant_turn(&mut events).await;
    assert_eq!(answer.speaker.participant_id(), Some("a"));
    assert!(answer.sidebar);
    next_event(&mut events, |e| matches!(e, RoundtableEvent::Halted { .. })).await;
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flushes_persistence() {
    let (handle, repository) = spawn(
        DiscussionMode::Debate,
        vec![scripted("a"), scripted("b")],
        ScriptedBackend::instant(),
    )
    .await;
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    for _ in 0..4 {
        next_participant_turn(&mut events).await;
    }
    handle.stop().await.unwrap();
    let turns = handle.turns().await.unwrap();

    handle.shutdown().await;

    assert!(handle.is_shut_down());
    assert_eq!(repository.stored(handle.discussion_id()).unwrap().turns, turns);
    assert!(handle.start().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_mention_prefill() {
    let (handle, _) = spawn(
        DiscussionMode::Chat,
        vec![scripted("a"), Participant::scripted("lu", "Lu Xun", vec![])],
        ScriptedBackend::instant(),
    )
    .await;

    assert_eq!(
        handle.mention_prefill("Lu Xun").await.unwrap().as_deref(),
        Some("@Lu Xun ")
    );
    assert_eq!(handle.mention_prefill("Nobody").await.unwrap(), None);
    handle.shutdown().await;
}
