/// Highest time division a section endpoint may occupy.
pub const MAX_DIVISION: u8 = 126;

/// Largest value the 7-bit start/end fields of an encoded section can carry.
pub const MAX_ENCODED_DIVISION: u8 = 127;

/// Preview ticks per time division.
pub const TICKS_PER_DIVISION: u32 = 10;

/// Channel count of the reference controller.
pub const DEFAULT_CHANNEL_COUNT: usize = 4;

/// Preview playhead position in ticks (tenths of a division).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Tick(pub u32);

impl Tick {
    /// First tick of `division`.
    pub fn from_division(division: u8) -> Self {
        Self(u32::from(division) * TICKS_PER_DIVISION)
    }

    /// Division this tick falls in.
    pub fn division(self) -> u32 {
        self.0 / TICKS_PER_DIVISION
    }

    /// Following tick, saturating at `u32::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Clamp a signed division coordinate into `0..=MAX_DIVISION`.
pub fn clamp_division(division: i32) -> u8 {
    // Clamped into u8 range above, the cast cannot truncate.
    division.clamp(0, i32::from(MAX_DIVISION)) as u8
}
