/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const RELP_DEFAULT_PORT: u16 = 2514;

#[derive(Clone, Debug)]
pub struct RelpClientConfig {
    pub(crate) server_addr: SocketAddr,
    pub(crate) connect_timeout: Duration,
}

impl Default for RelpClientConfig {
    fn default() -> Self {
        RelpClientConfig::new(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            RELP_DEFAULT_PORT,
        ))
    }
}

impl RelpClientConfig {
    pub fn new(server: SocketAddr) -> Self {
        RelpClientConfig {
            server_addr: server,
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn set_server_addr(&mut self, addr: SocketAddr) {
        self.server_addr = addr;
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }
}
