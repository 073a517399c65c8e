use crate::{
    foundation::core::{MAX_DIVISION, clamp_division},
    model::animation::Animation,
    model::section::{Section, SectionMode},
};

/// Handle to a section by channel and stored position.
///
/// Handles are positional: deleting a section or committing a channel (which sorts it) can
/// re-point handles into that channel, so callers re-select after either.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionRef {
    /// Channel index.
    pub channel: usize,
    /// Position within the channel's stored order.
    pub index: usize,
}

/// Mutation API over an [`Animation`] that keeps each channel overlap-free.
///
/// Geometric edits are whole-or-nothing: an edit that would overlap another section on the same
/// channel, or leave `end < start`, is ignored and reports `false`.
pub struct Editor<'a> {
    anim: &'a mut Animation,
}

impl<'a> Editor<'a> {
    /// Edit `anim` in place.
    pub fn new(anim: &'a mut Animation) -> Self {
        Self { anim }
    }

    /// Read-only view of the animation being edited.
    pub fn animation(&self) -> &Animation {
        self.anim
    }

    /// Section at `r`, if the handle is still valid.
    pub fn section(&self, r: SectionRef) -> Option<&Section> {
        self.anim.channel(r.channel)?.get(r.index)
    }

    /// Section on `channel` whose `[start, end]` contains `division`.
    pub fn select_at(&self, channel: usize, division: u8) -> Option<SectionRef> {
        let index = self.anim.channel(channel)?.index_at(division)?;
        Some(SectionRef { channel, index })
    }

    /// Insert a zero-length `On` section at `division` unless one already covers it.
    ///
    /// Returns the existing section when `division` is already covered, and `None` when the
    /// channel does not exist or `division` is past the last division.
    pub fn create_section(&mut self, channel: usize, division: u8) -> Option<SectionRef> {
        if division > MAX_DIVISION {
            return None;
        }
        if let Some(existing) = self.select_at(channel, division) {
            return Some(existing);
        }
        let index = self
            .anim
            .channel_mut(channel)?
            .push(Section::point(division));
        tracing::trace!(channel, division, "created section");
        Some(SectionRef { channel, index })
    }

    /// Insert a zero-length `On` section at `division` unless that point lies strictly inside
    /// another section.
    ///
    /// Unlike [`Editor::create_section`], a section's endpoint does not block the insert, so a new
    /// section can start where its neighbour ends.
    pub fn insert_point(&mut self, channel: usize, division: u8) -> Option<SectionRef> {
        if division > MAX_DIVISION {
            return None;
        }
        let ch = self.anim.channel_mut(channel)?;
        if ch.collides(None, division, division) {
            return None;
        }
        let index = ch.push(Section::point(division));
        tracing::trace!(channel, division, "inserted section");
        Some(SectionRef { channel, index })
    }

    /// Remove the section at `r`.
    pub fn delete_section(&mut self, r: SectionRef) -> Option<Section> {
        self.anim.channel_mut(r.channel)?.remove(r.index)
    }

    /// Move the start of `r` to `new_start`, clamped to the timeline.
    pub fn resize_start(&mut self, r: SectionRef, new_start: i32) -> bool {
        let Some(current) = self.section(r).copied() else {
            return false;
        };
        self.try_set_range(r, new_start, i32::from(current.end))
    }

    /// Move the end of `r` to `new_end`, clamped to the timeline.
    pub fn resize_end(&mut self, r: SectionRef, new_end: i32) -> bool {
        let Some(current) = self.section(r).copied() else {
            return false;
        };
        self.try_set_range(r, i32::from(current.start), new_end)
    }

    /// Shift both endpoints of `r` together.
    pub fn move_section(&mut self, r: SectionRef, delta_start: i32, delta_end: i32) -> bool {
        let Some(current) = self.section(r).copied() else {
            return false;
        };
        self.try_set_range(
            r,
            i32::from(current.start).saturating_add(delta_start),
            i32::from(current.end).saturating_add(delta_end),
        )
    }

    /// Cycle the mode of `r` (`On -> FadeOff -> FadeOn -> On`) and return the new mode.
    pub fn change_mode(&mut self, r: SectionRef) -> Option<SectionMode> {
        let section = self.anim.channel_mut(r.channel)?.get_mut(r.index)?;
        section.mode = section.mode.cycled();
        Some(section.mode)
    }

    /// Finish an edit gesture on `channel`: drop sections shorter than one division, sort by
    /// start and refresh the animation end time.
    pub fn commit(&mut self, channel: usize) {
        if let Some(ch) = self.anim.channel_mut(channel) {
            ch.normalize();
        }
        self.anim.refresh_end_time();
        tracing::debug!(
            channel,
            end_time = self.anim.end_time(),
            "committed channel"
        );
    }

    /// Empty every channel and reset the end time.
    pub fn clear(&mut self) {
        self.anim.clear();
    }

    fn try_set_range(&mut self, r: SectionRef, start: i32, end: i32) -> bool {
        let (start, end) = (clamp_division(start), clamp_division(end));
        if start > end {
            return false;
        }
        let Some(channel) = self.anim.channel_mut(r.channel) else {
            return false;
        };
        if channel.collides(Some(r.index), start, end) {
            tracing::trace!(channel = r.channel, start, end, "rejected colliding edit");
            return false;
        }
        let Some(section) = channel.get_mut(r.index) else {
            return false;
        };
        section.start = start;
        section.end = end;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/engine.rs"]
mod tests;
