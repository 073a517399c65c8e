use super::*;
use crate::model::{
    animation::Animation,
    channel::Channel,
    section::{Section, SectionMode},
};

fn one_section(start: u8, end: u8) -> Animation {
    Animation::from_channels(vec![
        Channel::from_sections(vec![Section::new(start, end, SectionMode::On)]),
        Channel::new(),
    ])
}

#[test]
fn zones_split_by_thirds() {
    assert_eq!(GrabZone::classify(0, 9, 1.0), GrabZone::Start);
    assert_eq!(GrabZone::classify(0, 9, 3.0), GrabZone::Start);
    assert_eq!(GrabZone::classify(0, 9, 4.5), GrabZone::Body);
    assert_eq!(GrabZone::classify(0, 9, 6.0), GrabZone::End);
    assert_eq!(GrabZone::classify(0, 9, 9.0), GrabZone::End);
}

#[test]
fn press_on_empty_space_creates_and_drags_end() {
    let mut anim = Animation::default();
    let mut ed = Editor::new(&mut anim);

    let g = Gesture::begin(&mut ed, 2, 12.4).unwrap();
    assert_eq!(g.zone(), GrabZone::End);
    assert_eq!(ed.section(g.section()), Some(&Section::point(12)));

    assert!(g.drag(&mut ed, 20.9));
    g.finish(&mut ed);

    let ch = ed.animation().channel(2).unwrap();
    assert_eq!(ch.sections(), &[Section::new(12, 20, SectionMode::On)]);
    assert_eq!(ed.animation().end_time(), 20);
}

#[test]
fn click_without_drag_leaves_nothing_behind() {
    let mut anim = Animation::default();
    let mut ed = Editor::new(&mut anim);
    let g = Gesture::begin(&mut ed, 0, 40.0).unwrap();
    g.finish(&mut ed);
    assert!(ed.animation().channel(0).unwrap().is_empty());
}

#[test]
fn body_drag_moves_relative_to_press() {
    let mut anim = one_section(10, 19);
    let mut ed = Editor::new(&mut anim);

    let g = Gesture::begin(&mut ed, 0, 14.5).unwrap();
    assert_eq!(g.zone(), GrabZone::Body);

    assert!(g.drag(&mut ed, 20.0));
    assert!(g.drag(&mut ed, 24.2));
    g.finish(&mut ed);

    let s = ed.animation().channel(0).unwrap().get(0).copied().unwrap();
    assert_eq!((s.start, s.end), (20, 29));
}

#[test]
fn start_handle_drag_respects_neighbours() {
    let mut anim = Animation::from_channels(vec![Channel::from_sections(vec![
        Section::new(0, 5, SectionMode::On),
        Section::new(10, 19, SectionMode::On),
    ])]);
    let mut ed = Editor::new(&mut anim);

    let g = Gesture::begin(&mut ed, 0, 10.5).unwrap();
    assert_eq!(g.zone(), GrabZone::Start);
    assert!(!g.drag(&mut ed, 3.0));
    assert!(g.drag(&mut ed, 5.0));
    g.finish(&mut ed);

    let starts: Vec<u8> = ed
        .animation()
        .channel(0)
        .unwrap()
        .sections()
        .iter()
        .map(|s| s.start)
        .collect();
    assert_eq!(starts, vec![0, 5]);
}

#[test]
fn out_of_range_press_is_ignored() {
    let mut anim = Animation::default();
    let mut ed = Editor::new(&mut anim);
    assert!(Gesture::begin(&mut ed, 0, -1.0).is_none());
    assert!(Gesture::begin(&mut ed, 0, 127.0).is_none());
    assert!(Gesture::begin(&mut ed, 0, f64::NAN).is_none());
    assert!(Gesture::begin(&mut ed, 8, 3.0).is_none());
}

#[test]
fn press_just_past_an_end_starts_an_adjoining_section() {
    let mut anim = one_section(10, 20);
    let mut ed = Editor::new(&mut anim);

    let g = Gesture::begin(&mut ed, 0, 20.5).unwrap();
    assert_eq!(g.zone(), GrabZone::End);
    assert_eq!(g.section().index, 1);
    assert_eq!(ed.section(g.section()), Some(&Section::point(20)));

    assert!(g.drag(&mut ed, 30.0));
    g.finish(&mut ed);

    assert_eq!(
        ed.animation().channel(0).unwrap().sections(),
        &[
            Section::new(10, 20, SectionMode::On),
            Section::new(20, 30, SectionMode::On),
        ]
    );
}

#[test]
fn press_exactly_on_an_end_grabs_that_section() {
    let mut anim = one_section(10, 20);
    let mut ed = Editor::new(&mut anim);

    let g = Gesture::begin(&mut ed, 0, 20.0).unwrap();
    assert_eq!(g.section().index, 0);
    assert_eq!(g.zone(), GrabZone::End);
}
