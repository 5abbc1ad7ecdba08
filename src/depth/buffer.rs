use super::types::{ArcDepthFrame, Resolution, Timestamp};
use log::debug;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;
pub const DEFAULT_MAX_FRAME_AGE: Timestamp = 1000;

/// Insertion-ordered history of converted frames, oldest first.
///
/// Two independent limits apply: at most `capacity` frames (oldest evicted
/// on insert) and no frame older than `max_age` relative to the timestamp
/// passed to [`TemporalDepthBuffer::prune`]. Arrival order doubles as
/// recency order; frames are never re-sorted by timestamp.
pub struct TemporalDepthBuffer {
    buffer: VecDeque<ArcDepthFrame>,
    capacity: usize,
    max_age: Timestamp,
}

impl TemporalDepthBuffer {
    pub fn new(capacity: usize, max_age: Timestamp) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity + 1),
            capacity,
            max_age,
        }
    }

    pub fn insert(&mut self, frame: ArcDepthFrame) {
        self.buffer.push_back(frame);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Drops every frame older than `max_age` relative to `now`, keeping the
    /// survivors in order. Returns how many frames were removed.
    pub fn prune(&mut self, now: Timestamp) -> usize {
        let before = self.buffer.len();
        let max_age = self.max_age;
        self.buffer.retain(|frame| !is_stale(frame.timestamp, now, max_age));

        let removed = before - self.buffer.len();
        if removed > 0 {
            debug!("Pruned {} stale depth frame(s) at {}", removed, now);
        }
        removed
    }

    /// Ordered view of the history for one fusion pass.
    pub fn snapshot(&self) -> Vec<ArcDepthFrame> {
        self.buffer.iter().cloned().collect()
    }

    /// Resolution of the frames that would survive `prune(now)`.
    pub fn retained_resolution(&self, now: Timestamp) -> Option<Resolution> {
        self.buffer
            .iter()
            .find(|frame| !is_stale(frame.timestamp, now, self.max_age))
            .map(|frame| frame.resolution())
    }

    pub fn latest_timestamp(&self) -> Option<Timestamp> {
        self.buffer.back().map(|frame| frame.timestamp)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_age(&self) -> Timestamp {
        self.max_age
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArcDepthFrame> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn is_stale(timestamp: Timestamp, now: Timestamp, max_age: Timestamp) -> bool {
    now.saturating_sub(timestamp) > max_age
}
