//! Chain orchestration
//!
//! Chained Beams scroll as one display by writing the same logical frame
//! to each chip at a different physical slot, so content leaving one chip
//! enters the next. Playback starts on the chip content enters first and
//! the others are started one by one as the frame progress of the running
//! chip reaches the expected value.
//!
//! ```text
//!  scroll left, G = 3           chain index:   0     1     2
//!  text frame f lands in slot                f+3   f+2   f+1
//!  start chip                                            *
//!  cascade polls                        pos 0 <- pos 1 <- pos 2
//! ```

use crate::playback::ScrollDirection;
use crate::registers::SyncRole;

/// Which render path produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderKind {
    /// Full text print
    Text,
    /// Text printed into one target frame
    TextAtFrame,
    /// Animation draw
    Animation,
}

/// Physical slot of a logical frame on a chip
///
/// `chip_index` is the chain index, `group_size` the number of chips.
pub const fn physical_slot(kind: RenderKind, frame: usize, group_size: usize, chip_index: usize) -> usize {
    match kind {
        RenderKind::Text => frame + group_size - chip_index,
        RenderKind::Animation => frame + group_size - 1 - chip_index,
        RenderKind::TextAtFrame => frame,
    }
}

/// Value recorded as the last frame written after writing `frame`
pub const fn last_frame_written(kind: RenderKind, frame: usize, group_size: usize) -> usize {
    match kind {
        RenderKind::Text => frame + group_size,
        RenderKind::Animation => frame + group_size - 1,
        RenderKind::TextAtFrame => frame + 1,
    }
}

/// Chain index of the chip started first
pub const fn start_chip(direction: ScrollDirection, group_size: usize) -> usize {
    match direction {
        ScrollDirection::Left => group_size.saturating_sub(1),
        ScrollDirection::Right => 0,
    }
}

/// Sync role of a chip in a chained group
pub const fn sync_role(direction: ScrollDirection, group_size: usize, chip_index: usize) -> SyncRole {
    if chip_index == start_chip(direction, group_size) {
        SyncRole::Source
    } else {
        SyncRole::Follower
    }
}

/// Chain index of a cascade position
///
/// Leftward scrolling walks the chain in order, rightward in reverse.
pub const fn chip_for_position(direction: ScrollDirection, group_size: usize, position: usize) -> usize {
    match direction {
        ScrollDirection::Left => position,
        ScrollDirection::Right => group_size.saturating_sub(1 + position),
    }
}

/// Outcome of one cascade poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CascadeStatus {
    /// Progress not reached yet
    Waiting,
    /// The chip at this chain index must be started
    Started(usize),
    /// The chip at this chain index must be started and the cascade is done
    Finished(usize),
}

/// Staged start of a chained group
///
/// `active` counts the chips not yet handed over; it starts at the group
/// size and the cascade is done once it drops to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cascade {
    group_size: usize,
    active: usize,
}

impl Cascade {
    /// Fresh cascade for a group
    pub const fn new(group_size: usize) -> Self {
        Self {
            group_size,
            active: group_size,
        }
    }

    /// Chips not yet handed over
    pub const fn active(&self) -> usize {
        self.active
    }

    /// Chain index of the chip to poll
    pub const fn poll_chip(&self, direction: ScrollDirection) -> usize {
        chip_for_position(direction, self.group_size, self.active.saturating_sub(1))
    }

    /// Frame progress that hands over to the next chip
    pub const fn expected_progress(&self) -> usize {
        self.group_size - self.active + 1
    }

    /// Feed the progress read from [`Cascade::poll_chip`]
    pub fn observe(&mut self, direction: ScrollDirection, progress: u8) -> CascadeStatus {
        if usize::from(progress) != self.expected_progress() {
            return CascadeStatus::Waiting;
        }
        self.active = self.active.saturating_sub(1);
        let next = chip_for_position(direction, self.group_size, self.active.saturating_sub(1));
        if self.active <= 1 {
            self.reset();
            CascadeStatus::Finished(next)
        } else {
            CascadeStatus::Started(next)
        }
    }

    /// Back to the initial state
    pub fn reset(&mut self) {
        self.active = self.group_size;
    }
}
