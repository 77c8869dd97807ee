/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::BufferError;
use crate::types::Severity;

pub(crate) struct BufferRecord {
    pub(crate) ts: DateTime<Utc>,
    pub(crate) severity: Severity,
    pub(crate) message: String,
}

impl BufferRecord {
    pub(crate) fn new(severity: Severity, message: String) -> Self {
        BufferRecord {
            ts: Utc::now(),
            severity,
            message,
        }
    }
}

struct RingState {
    slots: Vec<Option<BufferRecord>>,
    head: usize,
    tail: usize,
}

impl RingState {
    fn occupied(&self) -> usize {
        (self.tail + self.slots.len() - self.head) % self.slots.len()
    }
}

/// Fixed-capacity FIFO queue of pending records.
///
/// One slot beyond the usable capacity is kept vacant so a full queue can
/// be told from an empty one by the head/tail indices alone. The capacity
/// check and the index update of an operation happen under a single lock
/// acquisition, so they stay atomic under concurrent producers.
pub(crate) struct RecordBuffer {
    ring: Mutex<RingState>,
}

impl RecordBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        let slots = (0..capacity + 1).map(|_| None).collect();
        RecordBuffer {
            ring: Mutex::new(RingState {
                slots,
                head: 0,
                tail: 0,
            }),
        }
    }

    pub(crate) fn add(&self, record: BufferRecord) -> Result<(), BufferError> {
        let mut ring = self.ring.lock().unwrap();
        let len = ring.slots.len();
        if ring.occupied() + 1 == len {
            return Err(BufferError::Full);
        }
        let tail = ring.tail;
        ring.slots[tail] = Some(record);
        ring.tail = (tail + 1) % len;
        Ok(())
    }

    pub(crate) fn remove(&self) -> Result<BufferRecord, BufferError> {
        let mut ring = self.ring.lock().unwrap();
        if ring.head == ring.tail {
            return Err(BufferError::Empty);
        }
        let len = ring.slots.len();
        let head = ring.head;
        let record = ring.slots[head].take();
        ring.head = (head + 1) % len;
        record.ok_or(BufferError::Empty)
    }

    pub(crate) fn len(&self) -> usize {
        self.ring.lock().unwrap().occupied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        let ring = self.ring.lock().unwrap();
        ring.head == ring.tail
    }

    #[allow(unused)]
    pub(crate) fn reset(&self) {
        let mut ring = self.ring.lock().unwrap();
        ring.head = 0;
        ring.tail = 0;
        for slot in ring.slots.iter_mut() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: usize) -> BufferRecord {
        BufferRecord::new(Severity::Info, value.to_string())
    }

    #[test]
    fn fifo_order() {
        let buffer = RecordBuffer::new(10);
        for i in 0..10 {
            buffer.add(record(i)).unwrap();
        }
        for i in 0..10 {
            assert_eq!(buffer.remove().unwrap().message, i.to_string());
        }
        assert_eq!(buffer.remove().err(), Some(BufferError::Empty));
    }

    #[test]
    fn full_leaves_state_unchanged() {
        let buffer = RecordBuffer::new(4);
        for i in 0..4 {
            buffer.add(record(i)).unwrap();
        }
        assert_eq!(buffer.add(record(99)).err(), Some(BufferError::Full));
        assert_eq!(buffer.len(), 4);
        for i in 0..4 {
            assert_eq!(buffer.remove().unwrap().message, i.to_string());
        }
    }

    #[test]
    fn empty_leaves_state_unchanged() {
        let buffer = RecordBuffer::new(4);
        assert_eq!(buffer.remove().err(), Some(BufferError::Empty));
        assert_eq!(buffer.len(), 0);
        buffer.add(record(1)).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.remove().unwrap().message, "1");
    }

    #[test]
    fn size_accounting() {
        let buffer = RecordBuffer::new(10);
        assert!(buffer.is_empty());
        for i in 0..7 {
            buffer.add(record(i)).unwrap();
        }
        for _ in 0..3 {
            buffer.remove().unwrap();
        }
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn wraparound_behaves_like_fresh() {
        let buffer = RecordBuffer::new(10);
        // cycle the indices past the array boundary a few times
        for round in 0..5 {
            for i in 0..10 {
                buffer.add(record(round * 100 + i)).unwrap();
            }
            assert_eq!(buffer.add(record(0)).err(), Some(BufferError::Full));
            for i in 0..10 {
                assert_eq!(buffer.remove().unwrap().message, (round * 100 + i).to_string());
            }
            assert!(buffer.is_empty());
        }
    }

    #[test]
    fn interleaved_add_remove() {
        let buffer = RecordBuffer::new(10);
        for i in 0..10 {
            buffer.add(record(i)).unwrap();
            if i % 2 == 0 {
                buffer.remove().unwrap();
            }
        }
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn reset_clears() {
        let buffer = RecordBuffer::new(10);
        buffer.add(record(1)).unwrap();
        buffer.add(record(2)).unwrap();
        buffer.remove().unwrap();
        assert!(!buffer.is_empty());
        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.remove().err(), Some(BufferError::Empty));
    }
}
