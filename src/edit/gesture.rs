use crate::{
    edit::engine::{Editor, SectionRef},
    foundation::core::MAX_DIVISION,
};

/// Part of a section grabbed when a drag begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrabZone {
    /// First third: dragging moves the start.
    Start,
    /// Last third: dragging moves the end.
    End,
    /// Middle third: dragging moves the whole section.
    Body,
}

impl GrabZone {
    /// Pick the zone of `[start, end]` that `position` (in divisions) falls into.
    pub fn classify(start: u8, end: u8, position: f64) -> Self {
        let (start, end) = (f64::from(start), f64::from(end));
        let third = (end - start) / 3.0;
        if position <= start + third {
            Self::Start
        } else if position >= end - third {
            Self::End
        } else {
            Self::Body
        }
    }
}

/// A press-drag-release edit over (channel, division) coordinates.
///
/// Positions are in divisions and may be fractional; the caller owns any pixel mapping.
#[derive(Clone, Copy, Debug)]
pub struct Gesture {
    section: SectionRef,
    zone: GrabZone,
    anchor: i32,
    origin_start: u8,
    origin_end: u8,
}

impl Gesture {
    /// Press at `position` on `channel`.
    ///
    /// Grabs the section whose `[start, end]` contains the fractional `position`, or creates a
    /// zero-length section at its division and grabs its end. A press just past a section's end
    /// therefore starts a new section adjoining it. Returns `None` for a missing channel or a position outside the timeline.
    pub fn begin(editor: &mut Editor<'_>, channel: usize, position: f64) -> Option<Self> {
        if !position.is_finite() || position < 0.0 || position >= f64::from(MAX_DIVISION) + 1.0 {
            return None;
        }
        // Range-checked above.
        let division = position.floor() as u8;

        let grabbed = editor
            .animation()
            .channel(channel)?
            .sections()
            .iter()
            .position(|s| f64::from(s.start) <= position && position <= f64::from(s.end));
        let (section, zone) = match grabbed {
            Some(index) => {
                let r = SectionRef { channel, index };
                let s = editor.section(r)?;
                (r, GrabZone::classify(s.start, s.end, position))
            }
            None => (editor.insert_point(channel, division)?, GrabZone::End),
        };
        let s = editor.section(section)?;

        Some(Self {
            section,
            zone,
            anchor: i32::from(division),
            origin_start: s.start,
            origin_end: s.end,
        })
    }

    /// Section being edited.
    pub fn section(&self) -> SectionRef {
        self.section
    }

    /// Zone grabbed at press time.
    pub fn zone(&self) -> GrabZone {
        self.zone
    }

    /// Drag to `position`; returns whether the edit was applied.
    pub fn drag(&self, editor: &mut Editor<'_>, position: f64) -> bool {
        if !position.is_finite() {
            return false;
        }
        // Saturating float-to-int cast; endpoints are clamped by the editor.
        let division = position.floor() as i32;
        match self.zone {
            GrabZone::Start => editor.resize_start(self.section, division),
            GrabZone::End => editor.resize_end(self.section, division),
            GrabZone::Body => {
                let Some(current) = editor.section(self.section).copied() else {
                    return false;
                };
                let delta = division.saturating_sub(self.anchor);
                let target_start = i32::from(self.origin_start).saturating_add(delta);
                let target_end = i32::from(self.origin_end).saturating_add(delta);
                editor.move_section(
                    self.section,
                    target_start.saturating_sub(i32::from(current.start)),
                    target_end.saturating_sub(i32::from(current.end)),
                )
            }
        }
    }

    /// Release: commit the channel the gesture edited.
    pub fn finish(self, editor: &mut Editor<'_>) {
        editor.commit(self.section.channel);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/gesture.rs"]
mod tests;
