use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use roundtable_core::Roundtable;
use roundtable_core::discussion::{CreateDiscussionRequest, DiscussionMode};
use roundtable_core::participant::Participant;
use roundtable_core::phase::Phase;
use roundtable_core::role::RoleLabel;
use roundtable_core::roundtable::TickOutcome;

fn roster(k: usize) -> Vec<Participant> {
    (0..k)
        .map(|i| {
            Participant::scripted(
                format!("p{}", i),
                format!("Speaker{}", i),
                vec!["{topic}!".to_string()],
            )
        })
        .collect()
}

fn open_table(mode: DiscussionMode, k: usize, seed: u64) -> Roundtable {
    let discussion = CreateDiscussionRequest {
        title: None,
        topic: "X".to_string(),
        mode,
        roster: roster(k),
    }
    .into_discussion()
    .unwrap();
    let mut table = Roundtable::new(discussion).with_rng(StdRng::seed_from_u64(seed));
    table.open();
    table
}

proptest! {
    #[test]
    fn round_robin_visits_everyone_in_order(k in 1usize..=4, seed in any::<u64>()) {
        let mut table = open_table(DiscussionMode::Debate, k, seed);
        prop_assert!(matches!(table.tick(), TickOutcome::Advanced(_)));

        let mut speakers = Vec::new();
        while table.phase() == Phase::RoundRobin {
            match table.tick() {
                TickOutcome::Spoke { turn, .. } => {
                    prop_assert_eq!(turn.role, Some(RoleLabel::Opening));
                    speakers.push(turn.speaker.participant_id().unwrap().to_string());
                }
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }

        let expected: Vec<String> = (0..k).map(|i| format!("p{}", i)).collect();
        prop_assert_eq!(speakers, expected);
        prop_assert_eq!(table.phase(), Phase::Debate);
        prop_assert_eq!(table.state().turn_counter, 0);
    }

    #[test]
    fn debate_never_repeats_the_previous_speaker(k in 2usize..=4, seed in any::<u64>()) {
        let mut table = open_table(DiscussionMode::Chat, k, seed);
        while table.phase() != Phase::Debate {
            table.tick();
        }

        let mut previous: Option<String> = table
            .log()
            .last()
            .and_then(|t| t.speaker.participant_id().map(str::to_string));
        for _ in 0..30 {
            let TickOutcome::Spoke { turn, .. } = table.tick() else {
                return Err(TestCaseError::fail("debate should always dispatch"));
            };
            let current = turn.speaker.participant_id().map(str::to_string);
            prop_assert_ne!(&current, &previous);
            previous = current;
        }
    }

    #[test]
    fn opinion_pipeline_reaches_summary_after_four_plus_k_turns(k in 1usize..=4, seed in any::<u64>()) {
        let mut table = open_table(DiscussionMode::Opinion, k, seed);
        let mut turns = 0;
        let mut visited = vec![table.phase()];

        loop {
            match table.tick() {
                TickOutcome::Spoke { phase_change, .. } => {
                    turns += 1;
                    if let Some(change) = phase_change {
                        visited.push(change.to);
                    }
                }
                TickOutcome::Advanced(change) => visited.push(change.to),
                TickOutcome::Halted { phase } => {
                    prop_assert_eq!(phase, Phase::Summary);
                    break;
                }
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
            prop_assert!(turns <= 8, "pipeline did not terminate");
        }

        prop_assert_eq!(turns, 4 + k);
        prop_assert_eq!(
            visited,
            vec![
                Phase::Intro,
                Phase::Pioneer,
                Phase::Rationalist,
                Phase::Realist,
                Phase::Converger,
                Phase::Statements,
                Phase::Summary,
            ]
        );
    }
}

#[test]
fn mention_override_is_consumed_once() {
    let mut table = open_table(DiscussionMode::Chat, 3, 11);
    while table.phase() != Phase::Debate {
        table.tick();
    }

    table.accept_user_turn("@Speaker1 what do you say?").unwrap();
    assert_eq!(table.state().forced_speaker_id.as_deref(), Some("p1"));

    let TickOutcome::Spoke { turn, .. } = table.tick() else {
        panic!("expected a turn");
    };
    assert_eq!(turn.speaker.participant_id(), Some("p1"));
    assert_eq!(turn.role, Some(RoleLabel::Debate));
    assert!(table.state().forced_speaker_id.is_none());

    let TickOutcome::Spoke { turn, .. } = table.tick() else {
        panic!("expected a turn");
    };
    assert_ne!(turn.speaker.participant_id(), Some("p1"));
}
