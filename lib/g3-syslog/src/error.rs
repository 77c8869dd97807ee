/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer is full")]
    Full,
    #[error("buffer is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("timed out to wait for the send thread to finish")]
    Timeout,
}
