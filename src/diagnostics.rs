//! Bounded log of corrupted and unrecognized frames.
//!
//! Purely informational: the log never affects stored signal state or
//! listener dispatch. It exists so a diagnostics consumer can pull the most
//! recent offending frames without having been registered when they arrived.

use heapless::Vec;

pub const MAX_FRAME_HISTORY: usize = 32;
pub const MAX_FRAME_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Frame failed its CRC check.
    BadCrc,
    /// Frame decoded cleanly but was not recognized.
    Unknown,
}

/// One recorded frame. Payloads longer than [`MAX_FRAME_LEN`] are truncated;
/// J1850 frames never exceed it in practice.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub kind: FrameKind,
    pub bytes: Vec<u8, MAX_FRAME_LEN>,
}

/// Fixed-capacity frame history with oldest-first eviction, plus running
/// counters that survive eviction.
#[derive(Debug, Default)]
pub struct FrameLog {
    history: Vec<FrameRecord, MAX_FRAME_HISTORY>,
    bad_frames: u32,
    unknown_frames: u32,
}

impl FrameLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: FrameKind, frame: &[u8]) {
        match kind {
            FrameKind::BadCrc => self.bad_frames = self.bad_frames.wrapping_add(1),
            FrameKind::Unknown => self.unknown_frames = self.unknown_frames.wrapping_add(1),
        }

        if self.history.is_full() {
            self.history.remove(0);
        }

        let mut bytes = Vec::new();
        let take = frame.len().min(MAX_FRAME_LEN);
        // Cannot fail: `take` is clamped to capacity.
        let _ = bytes.extend_from_slice(&frame[..take]);
        let _ = self.history.push(FrameRecord { kind, bytes });
    }

    /// Total corrupted frames reported, including evicted ones.
    #[must_use]
    pub fn bad_frame_count(&self) -> u32 {
        self.bad_frames
    }

    /// Total unrecognized frames reported, including evicted ones.
    #[must_use]
    pub fn unknown_frame_count(&self) -> u32 {
        self.unknown_frames
    }

    /// Recent records, oldest first.
    #[must_use]
    pub fn recent(&self) -> &[FrameRecord] {
        &self.history
    }
}
