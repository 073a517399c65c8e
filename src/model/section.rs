use crate::foundation::core::Tick;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How an LED behaves across a section.
pub enum SectionMode {
    /// Full brightness for the whole section.
    #[default]
    On,
    /// Linear ramp from full brightness down to dark.
    FadeOff,
    /// Linear ramp from dark up to full brightness.
    FadeOn,
}

impl SectionMode {
    /// Resolve the `(start_on, fade)` flag pair stored on the wire.
    ///
    /// `(false, false)` has no meaning and yields `None`.
    pub fn from_flags(start_on: bool, fade: bool) -> Option<Self> {
        match (start_on, fade) {
            (true, false) => Some(Self::On),
            (true, true) => Some(Self::FadeOff),
            (false, true) => Some(Self::FadeOn),
            (false, false) => None,
        }
    }

    /// Whether the section begins lit.
    pub fn start_on(self) -> bool {
        matches!(self, Self::On | Self::FadeOff)
    }

    /// Whether brightness ramps across the section.
    pub fn fade(self) -> bool {
        matches!(self, Self::FadeOff | Self::FadeOn)
    }

    /// Next mode in the edit cycle `On -> FadeOff -> FadeOn -> On`.
    pub fn cycled(self) -> Self {
        match self {
            Self::On => Self::FadeOff,
            Self::FadeOff => Self::FadeOn,
            Self::FadeOn => Self::On,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// A timed on/off/fade interval on one channel, in whole divisions.
pub struct Section {
    /// First division covered (inclusive).
    pub start: u8,
    /// Last division covered (inclusive).
    pub end: u8,
    /// Brightness behaviour across the interval.
    pub mode: SectionMode,
}

impl Section {
    /// Create a section covering `[start, end]`.
    pub fn new(start: u8, end: u8, mode: SectionMode) -> Self {
        Self { start, end, mode }
    }

    /// Zero-length `On` section at `division`, as created by a click.
    pub fn point(division: u8) -> Self {
        Self::new(division, division, SectionMode::On)
    }

    /// Return `true` when `division` lies inside `[start, end]`.
    pub fn contains(&self, division: u8) -> bool {
        self.start <= division && division <= self.end
    }

    /// Number of divisions between the endpoints.
    pub fn span(&self) -> u8 {
        self.end.saturating_sub(self.start)
    }

    /// Sections shorter than one division are dropped on commit.
    pub fn is_degenerate(&self) -> bool {
        self.span() < 1
    }

    /// Return `true` when `[start, end]` shares more than an endpoint with this section.
    pub fn overlaps(&self, start: u8, end: u8) -> bool {
        start < self.end && end > self.start
    }

    /// First preview tick of the section.
    pub fn start_tick(&self) -> Tick {
        Tick::from_division(self.start)
    }

    /// Last preview tick of the section.
    pub fn end_tick(&self) -> Tick {
        Tick::from_division(self.end)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/section.rs"]
mod tests;
