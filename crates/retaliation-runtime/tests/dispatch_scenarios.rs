//! End-to-end dispatch scenarios against recording launchers.

use std::time::Duration;

use retaliation_core::testing::{recording_registry, Event, RecordingSleeper, Timeline};
use retaliation_core::{default_targets, CancelToken, CommandInterpreter, SequenceRunner, TargetResolver};
use retaliation_models::{BuildEvent, DeviceSlot};
use retaliation_runtime::{
    scrape_build_event, CycleOutcome, EventPoller, PollerConfig, PollerStats, Result, StatusSource,
};
use retaliation_usb::{CommandByte, Dialect};

/// Returns the same response body on every poll.
struct StaticBody(&'static str);

impl StatusSource for StaticBody {
    fn failed_build(&mut self) -> Result<Option<BuildEvent>> {
        Ok(scrape_build_event(self.0))
    }
}

fn poller(
    body: &'static str,
    dialect: Dialect,
    timeline: &Timeline,
    token: &CancelToken,
    cooldowns: usize,
) -> EventPoller<StaticBody> {
    let interpreter = CommandInterpreter::new(
        recording_registry(dialect, timeline),
        RecordingSleeper::new(timeline.clone()).with_token(token.clone()),
    );
    let runner = SequenceRunner::new(interpreter, token.clone());
    let resolver = TargetResolver::new(default_targets()).unwrap();

    EventPoller::new(
        StaticBody(body),
        resolver,
        runner,
        PollerConfig::new(),
        token.clone(),
        RecordingSleeper::new(timeline.clone())
            .with_token(token.clone())
            .cancel_after(cooldowns),
    )
}

fn command_bytes(timeline: &Timeline, slot: DeviceSlot) -> Vec<u8> {
    timeline
        .transfers_for(slot)
        .iter()
        .map(|t| t.data[1])
        .collect()
}

#[test]
fn test_tom_breaks_the_build() {
    let timeline = Timeline::new();
    let token = CancelToken::new();
    let mut poller = poller(
        r#"{"projectName":"Payments","changes":[{"username":"tom"}]}"#,
        Dialect::Thunder,
        &timeline,
        &token,
        1,
    );

    let outcome = poller.cycle();
    match &outcome {
        CycleOutcome::Dispatched {
            user,
            project,
            slot,
            report,
        } => {
            assert_eq!(user, "tom");
            assert_eq!(project, "Payments");
            assert_eq!(*slot, DeviceSlot::One);
            assert_eq!(report.applied, 5);
            assert_eq!(report.failed, 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let down = CommandByte::Down.bits();
    let left = CommandByte::Left.bits();
    let right = CommandByte::Right.bits();
    let up = CommandByte::Up.bits();
    let fire = CommandByte::Fire.bits();
    let stop = CommandByte::Stop.bits();

    // zero, right 4400, up 200, fire 4, zero
    assert_eq!(
        command_bytes(&timeline, DeviceSlot::One),
        vec![
            down, stop, left, stop,
            right, stop,
            up, stop,
            fire, fire, fire, fire,
            down, stop, left, stop,
        ]
    );
    assert!(timeline.transfers_for(DeviceSlot::Two).is_empty());

    let park = 2000 + 8000;
    let volley = 500 + 4 * 4500;
    let expected = park + 4400 + 200 + volley + park;
    assert_eq!(timeline.total_wait(), Duration::from_millis(expected));
}

#[test]
fn test_missing_username_only_cools_down() {
    let timeline = Timeline::new();
    let token = CancelToken::new();
    let mut poller = poller(
        r#"{"projectName":"Payments","status":"FAILURE"}"#,
        Dialect::Thunder,
        &timeline,
        &token,
        1,
    );

    let stats = poller.run();

    assert_eq!(stats, PollerStats { cycles: 1, dispatches: 0 });
    assert_eq!(timeline.events(), vec![Event::Wait(Duration::from_secs(60))]);
}

#[test]
fn test_unlisted_user_sends_nothing() {
    let timeline = Timeline::new();
    let token = CancelToken::new();
    let mut poller = poller(r#"{"username":"mallory"}"#, Dialect::Thunder, &timeline, &token, 1);

    assert!(matches!(poller.cycle(), CycleOutcome::NoTarget { .. }));
    assert!(timeline.events().is_empty());
}

#[test]
fn test_persistent_failure_is_punished_every_cycle() {
    let timeline = Timeline::new();
    let token = CancelToken::new();
    let mut poller = poller(
        r#"{"projectName":"Payments","username":"tom"}"#,
        Dialect::Thunder,
        &timeline,
        &token,
        3,
    );

    let stats = poller.run();

    assert_eq!(stats, PollerStats { cycles: 3, dispatches: 3 });
    let fires = command_bytes(&timeline, DeviceSlot::One)
        .into_iter()
        .filter(|b| *b == CommandByte::Fire.bits())
        .count();
    assert_eq!(fires, 12);
}

#[test]
fn test_original_dialect_skips_led_steps() {
    let timeline = Timeline::new();
    let token = CancelToken::new();
    let mut poller = poller(r#"{"username":"Leandro"}"#, Dialect::Original, &timeline, &token, 1);

    match poller.cycle() {
        CycleOutcome::Dispatched { slot, report, .. } => {
            assert_eq!(slot, DeviceSlot::Two);
            assert_eq!(report.applied, 7);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let transfers = timeline.transfers_for(DeviceSlot::Two);
    assert!(transfers.iter().all(|t| t.data.len() == 1));
    let fires = transfers
        .iter()
        .filter(|t| t.data[0] == CommandByte::Fire.bits())
        .count();
    assert_eq!(fires, 3);
}
