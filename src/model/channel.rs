use crate::model::section::Section;

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
/// One LED's sequence of sections.
///
/// Between edits the sequence is sorted by `start` and free of overlaps; while a gesture is in
/// progress it may be temporarily unsorted and contain zero-length sections.
pub struct Channel {
    sections: Vec<Section>,
}

impl Channel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing section list, preserving its order.
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Sections in stored order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Return `true` when the channel holds no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section at `index` in stored order.
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// Index of the first section (in stored order) containing `division`.
    pub fn index_at(&self, division: u8) -> Option<usize> {
        self.sections.iter().position(|s| s.contains(division))
    }

    pub(crate) fn push(&mut self, section: Section) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Section> {
        (index < self.sections.len()).then(|| self.sections.remove(index))
    }

    /// Return `true` when `[start, end]` would overlap any section other than `skip`.
    pub fn collides(&self, skip: Option<usize>, start: u8, end: u8) -> bool {
        self.sections
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, s)| s.overlaps(start, end))
    }

    /// Drop degenerate sections, then stable-sort the rest by `start`.
    pub(crate) fn normalize(&mut self) {
        self.sections.retain(|s| !s.is_degenerate());
        self.sections.sort_by_key(|s| s.start);
    }

    /// Return `true` when sections are sorted by `start` and pairwise non-overlapping.
    pub fn is_normalized(&self) -> bool {
        self.sections
            .windows(2)
            .all(|w| w[0].start <= w[1].start && w[0].end <= w[1].start)
    }

    /// Largest section end, if any.
    pub fn max_end(&self) -> Option<u8> {
        self.sections.iter().map(|s| s.end).max()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/channel.rs"]
mod tests;
