/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
#[cfg(test)]
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};

use g3_relp::{RelpClient, RelpClientConfig};

use crate::buffer::BufferRecord;
use crate::format::{SyslogHeader, format_record};

mod tcp;
mod udp;

#[cfg(test)]
mod collect;
#[cfg(test)]
use collect::CollectSink;

/// one established transport session, owned by the send thread
pub(crate) enum SyslogBackend {
    Tcp(TcpStream),
    Udp(UdpSocket),
    Relp(RelpClient),
    #[cfg(test)]
    Collect(CollectSink),
}

impl SyslogBackend {
    /// format and deliver one record over this session, returning the
    /// formatted line length
    pub(crate) async fn send_record(
        &mut self,
        header: &SyslogHeader,
        record: &BufferRecord,
        line_buf: &mut Vec<u8>,
    ) -> anyhow::Result<usize> {
        line_buf.clear();
        format_record(line_buf, header, record);
        match self {
            SyslogBackend::Tcp(stream) => {
                // non-transparent framing, one line per record
                line_buf.push(b'\n');
                stream.write_all(line_buf).await?;
            }
            SyslogBackend::Udp(socket) => {
                socket.send(line_buf).await?;
            }
            SyslogBackend::Relp(client) => {
                client.send_line(line_buf).await?;
            }
            #[cfg(test)]
            SyslogBackend::Collect(sink) => sink.push(line_buf),
        }
        Ok(line_buf.len())
    }

    /// close the session after a dispatched batch
    pub(crate) async fn close(self) {
        match self {
            SyslogBackend::Tcp(mut stream) => {
                let _ = stream.shutdown().await;
            }
            SyslogBackend::Udp(_) => {}
            SyslogBackend::Relp(client) => client.close().await,
            #[cfg(test)]
            SyslogBackend::Collect(_) => {}
        }
    }
}

/// The dial strategy: how to establish one transport session.
#[derive(Clone, Debug)]
pub enum SyslogBackendBuilder {
    /// tcp octet-stream with newline framed records
    Tcp(SocketAddr),
    /// udp socket with optional bind ip and remote address
    Udp(Option<IpAddr>, SocketAddr),
    /// relp session over tcp
    Relp(RelpClientConfig),
    /// collect formatted lines into a shared vec
    #[cfg(test)]
    Collect(Arc<Mutex<Vec<String>>>),
}

impl SyslogBackendBuilder {
    pub(crate) async fn build(&self) -> anyhow::Result<SyslogBackend> {
        match self {
            SyslogBackendBuilder::Tcp(server) => {
                let stream = tcp::tcp(*server).await?;
                Ok(SyslogBackend::Tcp(stream))
            }
            SyslogBackendBuilder::Udp(bind_ip, server) => {
                let socket = udp::udp(*bind_ip, *server).await?;
                Ok(SyslogBackend::Udp(socket))
            }
            SyslogBackendBuilder::Relp(config) => {
                let client = RelpClient::connect(config.clone()).await?;
                Ok(SyslogBackend::Relp(client))
            }
            #[cfg(test)]
            SyslogBackendBuilder::Collect(lines) => {
                Ok(SyslogBackend::Collect(CollectSink::new(Arc::clone(lines))))
            }
        }
    }
}
