use super::*;
use crate::model::section::{Section, SectionMode};

#[test]
fn default_has_four_empty_channels() {
    let anim = Animation::default();
    assert_eq!(anim.channel_count(), 4);
    assert!(anim.channels().iter().all(Channel::is_empty));
    assert_eq!(anim.end_time(), 0);
}

#[test]
fn from_channels_derives_end_time() {
    let anim = Animation::from_channels(vec![
        Channel::from_sections(vec![Section::new(0, 12, SectionMode::On)]),
        Channel::new(),
        Channel::from_sections(vec![Section::new(30, 41, SectionMode::FadeOn)]),
    ]);
    assert_eq!(anim.end_time(), 41);
    assert_eq!(anim.computed_end_time(), 41);
}

#[test]
fn from_parts_keeps_header_end_time() {
    let anim = Animation::from_parts(vec![Channel::new()], 99);
    assert_eq!(anim.end_time(), 99);
    assert_eq!(anim.computed_end_time(), 0);
}

#[test]
fn clear_keeps_channel_count() {
    let mut anim = Animation::from_channels(vec![
        Channel::from_sections(vec![Section::new(0, 12, SectionMode::On)]),
        Channel::new(),
    ]);
    anim.clear();
    assert_eq!(anim.channel_count(), 2);
    assert_eq!(anim.end_time(), 0);
    assert!(anim.channels().iter().all(Channel::is_empty));
}

#[test]
fn validate_rejects_unencodable_values() {
    let inverted = Animation::from_parts(
        vec![Channel::from_sections(vec![Section::new(9, 3, SectionMode::On)])],
        9,
    );
    assert!(matches!(
        inverted.validate(),
        Err(LedAnimError::Validation(_))
    ));

    let too_far = Animation::from_parts(
        vec![Channel::from_sections(vec![Section::new(9, 128, SectionMode::On)])],
        128,
    );
    assert!(too_far.validate().is_err());

    let too_many = Animation::with_channels(256);
    assert!(too_many.validate().is_err());

    assert!(Animation::default().validate().is_ok());
}

#[test]
fn json_roundtrip_preserves_sections() {
    let anim = Animation::from_channels(vec![Channel::from_sections(vec![
        Section::new(0, 4, SectionMode::FadeOff),
        Section::new(4, 8, SectionMode::FadeOn),
    ])]);
    let s = serde_json::to_string(&anim).unwrap();
    assert!(s.contains("fade_off"));
    let back: Animation = serde_json::from_str(&s).unwrap();
    assert_eq!(back, anim);
}
