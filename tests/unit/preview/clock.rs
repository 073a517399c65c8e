use super::*;
use crate::{
    document::AnimationDocument,
    model::{
        animation::Animation,
        channel::Channel,
        section::{Section, SectionMode},
    },
};
use std::sync::mpsc;

fn doc_with(sections: Vec<Section>) -> SharedDocument {
    AnimationDocument::with_animation(Animation::from_channels(vec![
        Channel::from_sections(sections),
        Channel::new(),
    ]))
    .into_shared()
}

fn fast() -> PreviewOpts {
    PreviewOpts { tick_period_ms: 1 }
}

fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn default_period_is_ten_ms() {
    assert_eq!(PreviewOpts::default().tick_period(), Duration::from_millis(10));
    assert_eq!(
        PreviewOpts { tick_period_ms: 0 }.tick_period(),
        Duration::from_millis(1)
    );
}

#[test]
fn starts_stopped_and_dark() {
    let clock = PreviewClock::spawn(doc_with(vec![]), fast()).unwrap();
    assert!(!clock.is_playing());
    assert_eq!(clock.position(), Tick(0));
    assert_eq!(clock.frame(), PreviewFrame::dark(2));
}

#[test]
fn play_advances_and_stop_goes_dark() {
    let clock = PreviewClock::spawn(
        doc_with(vec![Section::new(0, 100, SectionMode::On)]),
        fast(),
    )
    .unwrap();

    clock.play();
    wait_for(|| clock.position() > Tick(5));
    assert_eq!(clock.frame().levels[0], 255);

    clock.stop();
    assert!(!clock.is_playing());
    assert!(clock.frame().is_dark());
    let held = clock.position();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(clock.position(), held);
}

#[test]
fn toggle_flips_playback() {
    let clock = PreviewClock::spawn(doc_with(vec![]), fast()).unwrap();
    assert!(clock.toggle());
    assert!(clock.is_playing());
    assert!(!clock.toggle());
    assert!(!clock.is_playing());
}

#[test]
fn seek_stops_and_samples_immediately() {
    let clock = PreviewClock::spawn(
        doc_with(vec![Section::new(0, 10, SectionMode::FadeOn)]),
        fast(),
    )
    .unwrap();
    clock.play();
    clock.seek(Tick(50));
    assert!(!clock.is_playing());
    assert_eq!(clock.position(), Tick(50));
    assert_eq!(clock.frame().levels, vec![127, 0]);
}

#[test]
fn playhead_wraps_after_loop_end() {
    let (tx, rx) = mpsc::channel();
    let clock = PreviewClock::spawn_with_observer(
        doc_with(vec![Section::new(0, 1, SectionMode::On)]),
        fast(),
        move |frame: &PreviewFrame| {
            let _ = tx.send(frame.tick);
        },
    )
    .unwrap();
    clock.play();

    let mut ticks = Vec::new();
    while ticks.len() < 30 {
        ticks.push(rx.recv_timeout(Duration::from_secs(5)).unwrap());
    }
    clock.stop();

    assert!(ticks.iter().all(|&t| t <= Tick(11)));
    let wrapped = ticks.windows(2).any(|w| w[0] == Tick(11) && w[1] == Tick(0));
    assert!(wrapped, "ticks: {ticks:?}");
}

#[test]
fn observer_sees_stop_frame() {
    let (tx, rx) = mpsc::channel();
    let clock = PreviewClock::spawn_with_observer(
        doc_with(vec![Section::new(0, 50, SectionMode::On)]),
        fast(),
        move |frame: &PreviewFrame| {
            let _ = tx.send(frame.clone());
        },
    )
    .unwrap();
    clock.play();
    let lit = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(lit.levels[0], 255);

    clock.stop();
    let last = loop {
        let frame = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        if frame.is_dark() {
            break frame;
        }
    };
    assert_eq!(last.levels.len(), 2);
}

#[test]
fn reset_rewinds_after_document_change() {
    let doc = doc_with(vec![Section::new(0, 3, SectionMode::On)]);
    let clock = PreviewClock::spawn(Arc::clone(&doc), fast()).unwrap();
    clock.seek(Tick(20));

    *lock_document(&doc) = AnimationDocument::with_animation(Animation::with_channels(6));
    clock.reset();
    assert_eq!(clock.position(), Tick(0));
    assert_eq!(clock.frame(), PreviewFrame::dark(6));
}
