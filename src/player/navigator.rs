//! Queue navigation - next/prev index calculation
//!
//! All code that needs to determine which song comes next or previous
//! should use this module.

/// Computes wrap-around neighbours in a play queue
#[derive(Debug, Clone, Copy)]
pub struct QueueNavigator {
    queue_len: usize,
    current_idx: Option<usize>,
}

impl QueueNavigator {
    /// Create a new navigator.
    ///
    /// `current_idx` is `None` when the playing song is not in the queue.
    pub fn new(queue_len: usize, current_idx: Option<usize>) -> Self {
        Self {
            queue_len,
            current_idx: current_idx.filter(|&i| i < queue_len),
        }
    }

    /// Calculate the next track index, wrapping to the start
    pub fn next_index(&self) -> Option<usize> {
        if self.queue_len == 0 {
            return None;
        }

        match self.current_idx {
            Some(idx) => Some((idx + 1) % self.queue_len),
            None => Some(0),
        }
    }

    /// Calculate the previous track index, wrapping to the end
    pub fn prev_index(&self) -> Option<usize> {
        if self.queue_len == 0 {
            return None;
        }

        match self.current_idx {
            Some(idx) => Some((idx + self.queue_len - 1) % self.queue_len),
            // Not in the queue: step back onto the last entry
            None => Some(self.queue_len - 1),
        }
    }
}
