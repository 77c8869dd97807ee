/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

pub(crate) async fn udp(bind_ip: Option<IpAddr>, server: SocketAddr) -> io::Result<UdpSocket> {
    let bind_addr = match bind_ip {
        Some(ip) => SocketAddr::new(ip, 0),
        None => {
            let unspecified = if server.is_ipv4() {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V6(Ipv6Addr::UNSPECIFIED)
            };
            SocketAddr::new(unspecified, 0)
        }
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server).await?;
    Ok(socket)
}
