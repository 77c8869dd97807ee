/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex};

/// test sink that records every formatted line
pub(crate) struct CollectSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CollectSink {
    pub(crate) fn new(lines: Arc<Mutex<Vec<String>>>) -> Self {
        CollectSink { lines }
    }

    pub(crate) fn push(&self, line: &[u8]) {
        let mut lines = self.lines.lock().unwrap();
        lines.push(String::from_utf8_lossy(line).into_owned());
    }
}
