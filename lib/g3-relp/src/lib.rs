/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::{RelpConnectError, RelpFrameError, RelpRequestError};

mod frame;
pub use frame::{RelpCommand, RelpFrame};

mod config;
pub use config::RelpClientConfig;

mod client;
pub use client::RelpClient;
