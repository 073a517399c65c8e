use crate::{
    foundation::core::{TICKS_PER_DIVISION, Tick},
    model::animation::Animation,
    model::channel::Channel,
    model::section::Section,
};

/// Full brightness.
pub const FULL_BRIGHTNESS: u8 = u8::MAX;

/// Per-channel brightness at one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PreviewFrame {
    /// Tick the frame was sampled at.
    pub tick: Tick,
    /// One brightness value per channel, `0..=255`.
    pub levels: Vec<u8>,
}

impl PreviewFrame {
    /// All channels dark at tick 0.
    pub fn dark(channels: usize) -> Self {
        Self {
            tick: Tick::default(),
            levels: vec![0; channels],
        }
    }

    /// Return `true` when every channel is at 0.
    pub fn is_dark(&self) -> bool {
        self.levels.iter().all(|&l| l == 0)
    }
}

/// Last tick of the preview loop; the clock wraps to 0 after it.
pub fn loop_end(anim: &Animation) -> Tick {
    Tick(u32::from(anim.end_time()) * TICKS_PER_DIVISION + 1)
}

/// Brightness of `section` at `tick`, assuming the tick lies inside it.
///
/// `On` holds full brightness, `FadeOff` ramps 255 to 0 and `FadeOn` ramps 0 to 255. A
/// zero-length section has a ramp of 0.
///
/// The ramp is exact integer `255 * elapsed / span`, truncated, so a fade always reaches 255 (or
/// 0) at its end tick. A floating-point `255.0 / span * elapsed` can land one below at some ticks.
pub fn section_level(section: &Section, tick: Tick) -> u8 {
    let (start, end) = (section.start_tick().0, section.end_tick().0);
    let ramp = if end > start {
        let elapsed = tick.0.clamp(start, end) - start;
        // elapsed <= end - start, so the quotient is at most 255.
        (u32::from(FULL_BRIGHTNESS) * elapsed / (end - start)) as u8
    } else {
        0
    };
    match (section.mode.start_on(), section.mode.fade()) {
        (true, false) => FULL_BRIGHTNESS,
        (true, true) => FULL_BRIGHTNESS - ramp,
        (false, _) => ramp,
    }
}

fn channel_level(channel: &Channel, tick: Tick) -> u8 {
    let sections = channel.sections();
    let mut level = 0;
    for (i, s) in sections.iter().enumerate() {
        let (start, end) = (s.start_tick(), s.end_tick());
        if start <= tick && tick <= end {
            level = section_level(s, tick);
        }
        if tick == end.next() {
            let next = &sections[(i + 1) % sections.len()];
            if next.start_tick() != end {
                level = 0;
            }
        }
    }
    level
}

/// Brightness of `channel` at `tick`; 0 for a missing channel.
///
/// Sections are scanned in stored order and a later match overrides an earlier one. One tick
/// past a section's end the channel goes dark unless the cyclically next section starts where
/// this one ends.
pub fn brightness(anim: &Animation, channel: usize, tick: Tick) -> u8 {
    anim.channel(channel)
        .map(|c| channel_level(c, tick))
        .unwrap_or(0)
}

/// Sample every channel at `tick`.
pub fn sample(anim: &Animation, tick: Tick) -> PreviewFrame {
    PreviewFrame {
        tick,
        levels: anim
            .channels()
            .iter()
            .map(|c| channel_level(c, tick))
            .collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/interpreter.rs"]
mod tests;
