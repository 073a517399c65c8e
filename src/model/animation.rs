use crate::{
    foundation::core::{DEFAULT_CHANNEL_COUNT, MAX_ENCODED_DIVISION},
    foundation::error::{LedAnimError, LedAnimResult},
    model::channel::Channel,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A complete LED animation: a fixed set of channels plus the loop end time.
///
/// `end_time` is derived from the sections and refreshed on every commit; a decoded animation
/// keeps whatever value its header carried until the next commit.
pub struct Animation {
    channels: Vec<Channel>,
    end_time: u8,
}

impl Default for Animation {
    fn default() -> Self {
        Self::with_channels(DEFAULT_CHANNEL_COUNT)
    }
}

impl Animation {
    /// Create an animation with `count` empty channels.
    pub fn with_channels(count: usize) -> Self {
        Self {
            channels: vec![Channel::new(); count],
            end_time: 0,
        }
    }

    /// Assemble an animation from decoded parts without recomputing `end_time`.
    pub fn from_parts(channels: Vec<Channel>, end_time: u8) -> Self {
        Self { channels, end_time }
    }

    /// Build an animation from channels and derive `end_time` from their sections.
    pub fn from_channels(channels: Vec<Channel>) -> Self {
        let mut anim = Self::from_parts(channels, 0);
        anim.refresh_end_time();
        anim
    }

    /// Channels in order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel at `index`.
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub(crate) fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Loop end time in divisions, as last committed or decoded.
    pub fn end_time(&self) -> u8 {
        self.end_time
    }

    /// Largest section end across all channels (0 when there are no sections).
    pub fn computed_end_time(&self) -> u8 {
        self.channels
            .iter()
            .filter_map(Channel::max_end)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn refresh_end_time(&mut self) {
        self.end_time = self.computed_end_time();
    }

    pub(crate) fn clear(&mut self) {
        for channel in &mut self.channels {
            *channel = Channel::new();
        }
        self.end_time = 0;
    }

    /// Return `true` when every channel is sorted and overlap-free.
    pub fn is_normalized(&self) -> bool {
        self.channels.iter().all(Channel::is_normalized)
    }

    /// Check that the animation fits the binary format and that every section is well ordered.
    pub fn validate(&self) -> LedAnimResult<()> {
        if self.channels.len() > usize::from(u8::MAX) {
            return Err(LedAnimError::validation(format!(
                "animation has {} channels; at most 255 can be encoded",
                self.channels.len()
            )));
        }
        for (ci, channel) in self.channels.iter().enumerate() {
            if channel.len() > usize::from(u8::MAX) {
                return Err(LedAnimError::validation(format!(
                    "channel {ci} has {} sections; at most 255 can be encoded",
                    channel.len()
                )));
            }
            for s in channel.sections() {
                if s.start > s.end {
                    return Err(LedAnimError::validation(format!(
                        "channel {ci} section [{}, {}] ends before it starts",
                        s.start, s.end
                    )));
                }
                if s.end > MAX_ENCODED_DIVISION {
                    return Err(LedAnimError::validation(format!(
                        "channel {ci} section [{}, {}] exceeds division {MAX_ENCODED_DIVISION}",
                        s.start, s.end
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/animation.rs"]
mod tests;
