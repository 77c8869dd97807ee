/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod types;
pub use types::{Facility, Priority, Severity};

mod error;
pub use error::{BufferError, ShutdownError};

mod buffer;
mod format;
mod util;

mod stats;
pub use stats::{
    SendDropSnapshot, SendDropStats, SendIoSnapshot, SendIoStats, SendSnapshot, SendStats,
};

mod backend;
pub use backend::SyslogBackendBuilder;

mod sender;
pub use sender::{SyslogHandle, SyslogSender, SyslogSenderConfig};
