/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[cfg(unix)]
pub(crate) fn hostname() -> Option<String> {
    let uname = rustix::system::uname();
    let name = uname.nodename().to_string_lossy();
    if name.is_empty() {
        None
    } else {
        Some(name.into_owned())
    }
}

#[cfg(not(unix))]
pub(crate) fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}
