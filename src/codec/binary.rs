use crate::{
    foundation::core::MAX_ENCODED_DIVISION,
    foundation::error::{LedAnimError, LedAnimResult},
    model::animation::Animation,
    model::channel::Channel,
    model::section::{Section, SectionMode},
};

const START_ON_BIT: u16 = 1;
const FADE_BIT: u16 = 1 << 1;
const START_SHIFT: u16 = 2;
const END_SHIFT: u16 = 9;
const DIVISION_MASK: u16 = 0x7f;

/// Bytes taken by one packed section record.
pub const SECTION_RECORD_LEN: usize = 2;

/// Header length for `channel_count` channels: count byte, per-channel counts, end time.
pub fn header_len(channel_count: usize) -> usize {
    channel_count + 2
}

/// Pack a section into its 16-bit record.
///
/// Bit 0 is `start_on`, bit 1 is `fade`, bits 2-8 hold `start`, bits 9-15 hold `end`.
pub fn pack_section(section: &Section) -> LedAnimResult<u16> {
    if section.start > MAX_ENCODED_DIVISION || section.end > MAX_ENCODED_DIVISION {
        return Err(LedAnimError::validation(format!(
            "section [{}, {}] does not fit the 7-bit division fields",
            section.start, section.end
        )));
    }
    let mut record = 0u16;
    if section.mode.start_on() {
        record |= START_ON_BIT;
    }
    if section.mode.fade() {
        record |= FADE_BIT;
    }
    record |= u16::from(section.start) << START_SHIFT;
    record |= u16::from(section.end) << END_SHIFT;
    Ok(record)
}

/// Unpack a 16-bit record into a section.
pub fn unpack_section(record: u16) -> LedAnimResult<Section> {
    let start_on = record & START_ON_BIT != 0;
    let fade = record & FADE_BIT != 0;
    let mode = SectionMode::from_flags(start_on, fade).ok_or_else(|| {
        LedAnimError::decode(format!(
            "section record {record:#06x} has neither the start-on nor the fade bit set"
        ))
    })?;
    // Both fields are masked to 7 bits.
    let start = ((record >> START_SHIFT) & DIVISION_MASK) as u8;
    let end = ((record >> END_SHIFT) & DIVISION_MASK) as u8;
    if start > end {
        return Err(LedAnimError::decode(format!(
            "section record {record:#06x} ends at {end} before it starts at {start}"
        )));
    }
    Ok(Section::new(start, end, mode))
}

/// Encode an animation into the byte layout shared by `.cla` files and the upload payload.
///
/// The end-time byte is the largest section end, so the output depends only on the sections.
#[tracing::instrument(skip(anim), fields(channels = anim.channel_count()))]
pub fn encode(anim: &Animation) -> LedAnimResult<Vec<u8>> {
    anim.validate()?;

    let channels = anim.channels();
    let section_total: usize = channels.iter().map(Channel::len).sum();
    let mut out =
        Vec::with_capacity(header_len(channels.len()) + section_total * SECTION_RECORD_LEN);

    // `validate` bounds both counts to 255.
    out.push(channels.len() as u8);
    out.extend(channels.iter().map(|c| c.len() as u8));
    out.push(anim.computed_end_time());

    for channel in channels {
        for section in channel.sections() {
            out.extend_from_slice(&pack_section(section)?.to_be_bytes());
        }
    }

    tracing::debug!(bytes = out.len(), "encoded animation");
    Ok(out)
}

/// Decode bytes produced by [`encode`].
///
/// Header counts are checked against the buffer: truncated input and trailing bytes are both
/// rejected with [`LedAnimError::Decode`].
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> LedAnimResult<Animation> {
    let Some((&channel_count, rest)) = bytes.split_first() else {
        return Err(LedAnimError::decode("empty buffer"));
    };
    let channel_count = usize::from(channel_count);

    let header = header_len(channel_count);
    if bytes.len() < header {
        return Err(LedAnimError::decode(format!(
            "buffer of {} bytes is shorter than the {header}-byte header for {channel_count} channels",
            bytes.len()
        )));
    }
    let (counts, rest) = rest.split_at(channel_count);
    let (&end_time, records) = rest
        .split_first()
        .ok_or_else(|| LedAnimError::decode("missing end-time byte"))?;

    let expected: usize = counts
        .iter()
        .map(|&n| usize::from(n) * SECTION_RECORD_LEN)
        .sum();
    if records.len() != expected {
        return Err(LedAnimError::decode(format!(
            "header declares {expected} bytes of section records but {} follow",
            records.len()
        )));
    }

    let mut pairs = records.chunks_exact(SECTION_RECORD_LEN);
    let mut channels = Vec::with_capacity(channel_count);
    for &count in counts {
        let mut sections = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let pair = pairs
                .next()
                .ok_or_else(|| LedAnimError::decode("section records ended early"))?;
            sections.push(unpack_section(u16::from_be_bytes([pair[0], pair[1]]))?);
        }
        channels.push(Channel::from_sections(sections));
    }

    Ok(Animation::from_parts(channels, end_time))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/binary.rs"]
mod tests;
