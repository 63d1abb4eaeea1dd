mod common;

use std::sync::Arc;

use common::*;
use roundtable_application::DiscussionUseCase;
use roundtable_core::discussion::{
    CreateDiscussionRequest, DiscussionLog, DiscussionMode, DiscussionRepository, SentinelKind,
    Speaker, TurnDraft,
};
use roundtable_core::participant::{ModelBinding, ModelProvider, Participant};
use roundtable_core::phase::Phase;
use roundtable_core::role::RoleLabel;

struct Fixture {
    usecase: DiscussionUseCase,
    discussions: Arc<MockDiscussionRepository>,
    backend: Arc<ScriptedBackend>,
}

fn fixture(custom: Vec<Participant>) -> Fixture {
    let discussions = Arc::new(MockDiscussionRepository::default());
    let characters = Arc::new(MockCharacterRepository::with(custom));
    let backend = ScriptedBackend::instant();
    let usecase = DiscussionUseCase::new(
        discussions.clone(),
        characters,
        backend.clone(),
        test_config(),
    );
    Fixture {
        usecase,
        discussions,
        backend,
    }
}

fn request(roster: Vec<Participant>) -> CreateDiscussionRequest {
    CreateDiscussionRequest {
        title: None,
        topic: "Should cities ban cars?".to_string(),
        mode: DiscussionMode::Debate,
        roster,
    }
}

#[tokio::test]
async fn test_create_saves_with_opening_line() {
    let f = fixture(vec![]);
    let roster = f
        .usecase
        .find_characters(&["musk".to_string(), "einstein".to_string()])
        .await
        .unwrap();

    let discussion = f.usecase.create(request(roster)).await.unwrap();

    let stored = f.discussions.stored(&discussion.id).unwrap();
    assert_eq!(stored, discussion);
    assert_eq!(stored.turns.len(), 1);
    assert_eq!(
        stored.turns[0].speaker,
        Speaker::Sentinel {
            kind: SentinelKind::Host
        }
    );
    assert!(stored.turns[0].text.starts_with("Welcome to the roundtable."));
    assert_eq!(stored.title, "Elon Musk & Friends");
}

#[tokio::test]
async fn test_create_rejects_invalid_requests() {
    let f = fixture(vec![]);

    let err = f.usecase.create(request(vec![])).await.unwrap_err();

    assert!(err.to_string().contains("between 1 and 4"));
    assert!(f.usecase.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_characters_unknown_id() {
    let f = fixture(vec![]);

    let err = f
        .usecase
        .find_characters(&["nobody".to_string()])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("nobody"));
}

#[tokio::test]
async fn test_custom_character_overrides_builtin() {
    let custom = Participant::generative("musk", "Custom Musk", None, None);
    let f = fixture(vec![custom.clone(), generative("sage")]);

    let all = f.usecase.available_characters().await.unwrap();

    let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["einstein", "luxun", "kobe", "musk", "sage"]);
    assert_eq!(all[3], custom);
}

#[tokio::test]
async fn test_open_refreshes_bindings_and_caches_runtime() {
    let mut stale = generative("sage");
    stale.kind = Participant::generative(
        "sage",
        "SAGE",
        None,
        Some(ModelBinding::new(ModelProvider::Ollama, "old-model")),
    )
    .kind;
    let mut current = generative("sage");
    current.kind = Participant::generative(
        "sage",
        "SAGE",
        Some("Now with a description".to_string()),
        Some(ModelBinding::new(ModelProvider::Deepseek, "deepseek-chat")),
    )
    .kind;
    let f = fixture(vec![current.clone()]);
    let discussion = f.usecase.create(request(vec![stale, scripted("a")])).await.unwrap();

    let handle = f.usecase.open_discussion(&discussion.id).await.unwrap();
    let again = f.usecase.open_discussion(&discussion.id).await.unwrap();

    assert!(handle.is_same_runtime(&again));
    let stored = f.discussions.stored(&discussion.id).unwrap();
    assert_eq!(stored.roster[0].kind, current.kind);
    assert_eq!(handle.status().phase, Phase::Intro);
    f.usecase.shutdown_all().await;
    assert!(handle.is_shut_down());
}

#[tokio::test(start_paused = true)]
async fn test_open_runs_generative_turns_with_refreshed_binding() {
    let current = Participant::generative(
        "sage",
        "Sage",
        None,
        Some(ModelBinding::new(ModelProvider::Ollama, "fresh-model")),
    );
    let mut stale = current.clone();
    stale.kind = Participant::generative("sage", "Sage", None, None).kind;
    let f = fixture(vec![current]);
    let discussion = f.usecase.create(request(vec![stale])).await.unwrap();

    let handle = f.usecase.open_discussion(&discussion.id).await.unwrap();
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    let turn = next_participant_turn(&mut events).await;

    assert_eq!(turn.text, "reply 1");
    assert!(!turn.failed);
    assert_eq!(*f.backend.models.lock().unwrap(), vec!["fresh-model".to_string()]);
    f.usecase.shutdown_all().await;
}

#[tokio::test]
async fn test_open_replays_session_state() {
    let f = fixture(vec![]);
    let mut discussion = f
        .usecase
        .create(CreateDiscussionRequest {
            mode: DiscussionMode::Opinion,
            ..request(vec![scripted("a"), scripted("b")])
        })
        .await
        .unwrap();
    let mut log = DiscussionLog::from_turns(discussion.turns.clone());
    log.append(
        TurnDraft::new(Speaker::participant(&discussion.roster[0]), "bold")
            .with_role(RoleLabel::Pioneer),
    );
    discussion.turns = log.into_turns();
    f.discussions.save(&discussion).await.unwrap();

    let handle = f.usecase.open_discussion(&discussion.id).await.unwrap();

    assert_eq!(handle.status().phase, Phase::Rationalist);
    assert_eq!(handle.turns().await.unwrap().len(), 2);
    f.usecase.shutdown_all().await;
}

#[tokio::test]
async fn test_open_missing_discussion() {
    let f = fixture(vec![]);

    let err = f.usecase.open_discussion("missing").await.unwrap_err();

    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn test_delete_stops_runtime() {
    let f = fixture(vec![]);
    let discussion = f.usecase.create(request(vec![scripted("a")])).await.unwrap();
    let handle = f.usecase.open_discussion(&discussion.id).await.unwrap();

    f.usecase.delete(&discussion.id).await.unwrap();

    assert!(handle.is_shut_down());
    assert!(handle.turns().await.is_err());
    assert!(f.discussions.stored(&discussion.id).is_none());
}
