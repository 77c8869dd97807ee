/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::warn;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use crate::{RelpClientConfig, RelpCommand, RelpConnectError, RelpFrame, RelpRequestError};

const RELP_VERSION: u32 = 0;
const RELP_SOFTWARE: &str = "g3-relp";
const OFFER_COMMANDS: &str = "syslog";

// txn 1 is reserved for the open handshake
const TXN_OPEN: u64 = 1;
// the first data txn after a successful open
const TXN_FIRST_SYSLOG: u64 = 2;

/// A client session to a RELP server.
///
/// Each write is one full round trip: the `syslog` frame is followed by a
/// synchronous read of its acknowledgment. The live stream and the txn
/// counter are only reachable through `&mut self`, so a session can never
/// be driven by two writers at once.
pub struct RelpClient {
    config: RelpClientConfig,
    stream: Option<BufStream<TcpStream>>,
    next_txn: u64,
    write_buf: Vec<u8>,
}

impl RelpClient {
    /// Dial the server and run the open handshake.
    pub async fn connect(config: RelpClientConfig) -> Result<Self, RelpConnectError> {
        let mut client = RelpClient {
            config,
            stream: None,
            next_txn: TXN_FIRST_SYSLOG,
            write_buf: Vec::with_capacity(1024),
        };
        client.reconnect().await?;
        Ok(client)
    }

    async fn reconnect(&mut self) -> Result<(), RelpConnectError> {
        self.stream = None;
        let stream =
            match tokio::time::timeout(self.config.connect_timeout, self.open_session()).await {
                Ok(r) => r?,
                Err(_) => return Err(RelpConnectError::ConnectTimedOut),
            };
        self.stream = Some(stream);
        self.next_txn = TXN_FIRST_SYSLOG;
        Ok(())
    }

    async fn open_session(&mut self) -> Result<BufStream<TcpStream>, RelpConnectError> {
        let stream = TcpStream::connect(self.config.server_addr)
            .await
            .map_err(RelpConnectError::ConnectIoError)?;
        let mut stream = BufStream::new(stream);

        let offer = format!(
            "relp_version={RELP_VERSION}\nrelp_software={RELP_SOFTWARE}\ncommands={OFFER_COMMANDS}"
        );
        self.write_buf.clear();
        RelpFrame::encode_message(
            &mut self.write_buf,
            TXN_OPEN,
            RelpCommand::Open,
            offer.as_bytes(),
        );
        stream
            .write_all(&self.write_buf)
            .await
            .map_err(RelpConnectError::SendOfferFailed)?;
        stream
            .flush()
            .await
            .map_err(RelpConnectError::SendOfferFailed)?;

        let rsp = RelpFrame::read(&mut stream)
            .await
            .map_err(RelpConnectError::InvalidOfferResponse)?;
        if rsp.command != RelpCommand::Rsp || rsp.txn != TXN_OPEN {
            return Err(RelpConnectError::UnexpectedOfferResponse {
                txn: rsp.txn,
                command: rsp.command,
            });
        }
        if !rsp.data.starts_with(b"200") {
            let status = rsp.data.split(|c| *c == b'\n').next().unwrap_or_default();
            return Err(RelpConnectError::OfferRejected(
                String::from_utf8_lossy(status).into_owned(),
            ));
        }
        Ok(stream)
    }

    /// Send one formatted syslog line and wait for its acknowledgment.
    ///
    /// A failed attempt on a live session triggers exactly one reconnect
    /// followed by one retry of this line; the retry result is final.
    pub async fn send_line(&mut self, line: &[u8]) -> Result<(), RelpRequestError> {
        if self.stream.is_some() {
            match self.send_once(line).await {
                Ok(_) => return Ok(()),
                Err(e) => warn!(
                    "relp write to {} failed, will reconnect and retry: {e}",
                    self.config.server_addr
                ),
            }
        }
        self.reconnect()
            .await
            .map_err(RelpRequestError::ReconnectFailed)?;
        self.send_once(line).await
    }

    async fn send_once(&mut self, line: &[u8]) -> Result<(), RelpRequestError> {
        let RelpClient {
            stream,
            next_txn,
            write_buf,
            ..
        } = self;
        let Some(stream) = stream.as_mut() else {
            return Err(RelpRequestError::NotConnected);
        };

        let txn = *next_txn;
        *next_txn += 1;

        write_buf.clear();
        RelpFrame::encode_message(write_buf, txn, RelpCommand::Syslog, line);
        stream
            .write_all(write_buf)
            .await
            .map_err(RelpRequestError::WriteFailed)?;
        stream
            .flush()
            .await
            .map_err(RelpRequestError::WriteFailed)?;

        let ack = RelpFrame::read(stream)
            .await
            .map_err(RelpRequestError::InvalidResponse)?;
        if ack.command != RelpCommand::Rsp {
            return Err(RelpRequestError::UnexpectedResponseCommand(ack.command));
        }
        if ack.txn != txn {
            return Err(RelpRequestError::TxnMismatch {
                expected: txn,
                actual: ack.txn,
            });
        }
        Ok(())
    }

    /// Send a best-effort close frame and drop the session.
    pub async fn close(mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        self.write_buf.clear();
        RelpFrame::encode_message(&mut self.write_buf, self.next_txn, RelpCommand::Close, &[]);
        let _ = stream.write_all(&self.write_buf).await;
        let _ = stream.flush().await;
        let _ = stream.shutdown().await;
    }
}
