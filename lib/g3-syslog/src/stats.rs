/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct SendSnapshot {
    pub io: SendIoSnapshot,
    pub drop: SendDropSnapshot,
}

#[derive(Default, Debug, Eq, PartialEq)]
pub struct SendIoSnapshot {
    pub total: u64,
    pub passed: u64,
    pub size: u64,
}

#[derive(Default, Debug, Eq, PartialEq)]
pub struct SendDropSnapshot {
    pub buffer_full: u64,
    pub peer_unreachable: u64,
    pub write_failed: u64,
}

#[derive(Default)]
pub struct SendStats {
    pub io: SendIoStats,
    pub drop: SendDropStats,
}

impl SendStats {
    pub fn snapshot(&self) -> SendSnapshot {
        SendSnapshot {
            io: self.io.snapshot(),
            drop: self.drop.snapshot(),
        }
    }
}

#[derive(Default)]
pub struct SendIoStats {
    total: AtomicU64,
    passed: AtomicU64,
    size: AtomicU64,
}

impl SendIoStats {
    pub fn snapshot(&self) -> SendIoSnapshot {
        SendIoSnapshot {
            total: self.total.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            size: self.size.load(Ordering::Relaxed),
        }
    }

    pub fn add_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_passed(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_size(&self, size: usize) {
        self.size.fetch_add(size as u64, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct SendDropStats {
    buffer_full: AtomicU64,
    peer_unreachable: AtomicU64,
    write_failed: AtomicU64,
}

impl SendDropStats {
    pub fn snapshot(&self) -> SendDropSnapshot {
        SendDropSnapshot {
            buffer_full: self.buffer_full.load(Ordering::Relaxed),
            peer_unreachable: self.peer_unreachable.load(Ordering::Relaxed),
            write_failed: self.write_failed.load(Ordering::Relaxed),
        }
    }

    pub fn add_buffer_full(&self) {
        self.buffer_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_peer_unreachable_n(&self, n: usize) {
        self.peer_unreachable.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn add_write_failed(&self) {
        self.write_failed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_stats() {
        let stats = SendIoStats::default();
        stats.add_total();
        stats.add_total();
        stats.add_passed();
        stats.add_size(512);
        assert_eq!(
            stats.snapshot(),
            SendIoSnapshot {
                total: 2,
                passed: 1,
                size: 512
            }
        )
    }

    #[test]
    fn drop_stats() {
        let stats = SendDropStats::default();
        stats.add_buffer_full();
        stats.add_peer_unreachable_n(3);
        stats.add_write_failed();
        assert_eq!(
            stats.snapshot(),
            SendDropSnapshot {
                buffer_full: 1,
                peer_unreachable: 3,
                write_failed: 1
            }
        )
    }
}
