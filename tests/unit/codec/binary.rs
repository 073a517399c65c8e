use super::*;

fn sample() -> Animation {
    Animation::from_channels(vec![
        Channel::from_sections(vec![
            Section::new(0, 10, SectionMode::FadeOn),
            Section::new(10, 20, SectionMode::FadeOff),
        ]),
        Channel::new(),
        Channel::from_sections(vec![Section::new(126, 126, SectionMode::On)]),
        Channel::from_sections(vec![Section::new(5, 10, SectionMode::On)]),
    ])
}

#[test]
fn pack_matches_documented_layout() {
    let record = pack_section(&Section::new(5, 10, SectionMode::On)).unwrap();
    assert_eq!(record, 0x1415);
    assert_eq!(record.to_be_bytes(), [0x14, 0x15]);

    let fade_off = pack_section(&Section::new(0, 0, SectionMode::FadeOff)).unwrap();
    assert_eq!(fade_off, 0b11);
    let fade_on = pack_section(&Section::new(0, 0, SectionMode::FadeOn)).unwrap();
    assert_eq!(fade_on, 0b10);
}

#[test]
fn pack_rejects_eight_bit_divisions() {
    let err = pack_section(&Section::new(0, 128, SectionMode::On)).unwrap_err();
    assert!(matches!(err, LedAnimError::Validation(_)));
}

#[test]
fn unpack_inverts_pack_for_extremes() {
    for s in [
        Section::new(0, 0, SectionMode::On),
        Section::new(127, 127, SectionMode::FadeOn),
        Section::new(0, 127, SectionMode::FadeOff),
    ] {
        assert_eq!(unpack_section(pack_section(&s).unwrap()).unwrap(), s);
    }
}

#[test]
fn unpack_rejects_meaningless_flags() {
    // start_on = 0, fade = 0
    let err = unpack_section(0x1414).unwrap_err();
    assert!(matches!(err, LedAnimError::Decode(_)));
}

#[test]
fn unpack_rejects_inverted_range() {
    // start = 10, end = 5
    let record = 1 | (10 << 2) | (5 << 9);
    assert!(unpack_section(record).is_err());
}

#[test]
fn encode_layout_for_mixed_channels() {
    let bytes = encode(&sample()).unwrap();
    assert_eq!(&bytes[..6], &[4, 2, 0, 1, 1, 126]);
    assert_eq!(bytes.len(), header_len(4) + 4 * SECTION_RECORD_LEN);
}

#[test]
fn encode_uses_section_derived_end_time() {
    let stale = Animation::from_parts(
        vec![Channel::from_sections(vec![Section::new(2, 9, SectionMode::On)])],
        50,
    );
    let bytes = encode(&stale).unwrap();
    assert_eq!(bytes[2], 9);
}

#[test]
fn decode_inverts_encode() {
    let anim = sample();
    let bytes = encode(&anim).unwrap();
    let back = decode(&bytes).unwrap();
    assert_eq!(back, anim);
    assert_eq!(encode(&back).unwrap(), bytes);
}

#[test]
fn decode_preserves_unsorted_order() {
    let anim = Animation::from_channels(vec![Channel::from_sections(vec![
        Section::new(30, 40, SectionMode::On),
        Section::new(0, 10, SectionMode::On),
    ])]);
    let back = decode(&encode(&anim).unwrap()).unwrap();
    assert_eq!(back.channel(0).unwrap().get(0).unwrap().start, 30);
}

#[test]
fn zero_channel_animation_is_two_bytes() {
    let anim = Animation::with_channels(0);
    let bytes = encode(&anim).unwrap();
    assert_eq!(bytes, vec![0, 0]);
    assert_eq!(decode(&bytes).unwrap(), anim);
}

#[test]
fn decode_rejects_empty_and_short_headers() {
    assert!(matches!(decode(&[]), Err(LedAnimError::Decode(_))));
    assert!(matches!(decode(&[4, 0, 0]), Err(LedAnimError::Decode(_))));
    assert!(matches!(decode(&[1]), Err(LedAnimError::Decode(_))));
}

#[test]
fn decode_rejects_truncated_records() {
    let bytes = encode(&sample()).unwrap();
    let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, LedAnimError::Decode(_)));
}

#[test]
fn decode_rejects_trailing_bytes() {
    let mut bytes = encode(&sample()).unwrap();
    bytes.push(0);
    assert!(matches!(decode(&bytes), Err(LedAnimError::Decode(_))));
}
