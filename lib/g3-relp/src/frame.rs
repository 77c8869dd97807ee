/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;

use atoi::FromRadix10Checked;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::RelpFrameError;

// the TXNR field is at most 9 decimal digits
const TXN_STRING_MAX_SIZE: usize = 9;
const COMMAND_STRING_MAX_SIZE: usize = 32;
const DATA_LEN_STRING_MAX_SIZE: usize = 9;
// default DATA size limit of rsyslog's imrelp
const DATA_MAX_SIZE: usize = 128 << 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelpCommand {
    Open,
    Syslog,
    Close,
    Rsp,
    Abort,
}

impl RelpCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelpCommand::Open => "open",
            RelpCommand::Syslog => "syslog",
            RelpCommand::Close => "close",
            RelpCommand::Rsp => "rsp",
            RelpCommand::Abort => "abort",
        }
    }

    fn from_bytes(v: &[u8]) -> Option<Self> {
        match v {
            b"open" => Some(RelpCommand::Open),
            b"syslog" => Some(RelpCommand::Syslog),
            b"close" => Some(RelpCommand::Close),
            b"rsp" => Some(RelpCommand::Rsp),
            b"abort" => Some(RelpCommand::Abort),
            _ => None,
        }
    }
}

impl fmt::Display for RelpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single RELP frame: `TXNR SP COMMAND SP DATALEN [SP DATA] LF`
#[derive(Debug, PartialEq, Eq)]
pub struct RelpFrame {
    pub txn: u64,
    pub command: RelpCommand,
    pub data: Vec<u8>,
}

impl RelpFrame {
    pub fn new(txn: u64, command: RelpCommand, data: Vec<u8>) -> Self {
        RelpFrame { txn, command, data }
    }

    /// Append the wire form of one frame to `buf`.
    ///
    /// A zero DATALEN gets no DATA part and no separating space.
    pub fn encode_message(buf: &mut Vec<u8>, txn: u64, command: RelpCommand, data: &[u8]) {
        let mut int_buf = itoa::Buffer::new();
        buf.extend_from_slice(int_buf.format(txn).as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(command.as_str().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(int_buf.format(data.len()).as_bytes());
        if !data.is_empty() {
            buf.push(b' ');
            buf.extend_from_slice(data);
        }
        buf.push(b'\n');
    }

    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        RelpFrame::encode_message(buf, self.txn, self.command, &self.data);
    }

    /// Read one frame from a buffered stream.
    ///
    /// The reader has to persist across frames, as one byte may be peeked
    /// beyond a header to detect a zero DATALEN.
    pub async fn read<R>(reader: &mut R) -> Result<Self, RelpFrameError>
    where
        R: AsyncBufRead + Unpin,
    {
        let token = read_token(reader, TXN_STRING_MAX_SIZE).await?;
        let txn = match u64::from_radix_10_checked(&token) {
            (Some(txn), used_len) if used_len == token.len() => txn,
            _ => return Err(RelpFrameError::InvalidTxn),
        };

        let token = read_token(reader, COMMAND_STRING_MAX_SIZE).await?;
        let command = RelpCommand::from_bytes(&token).ok_or_else(|| {
            RelpFrameError::UnknownCommand(String::from_utf8_lossy(&token).into_owned())
        })?;

        let data = if peek_u8(reader).await? == b'0' {
            reader.consume(1);
            // some peers emit the separating space even for an empty DATA part
            let mut ending = read_u8(reader).await?;
            if ending == b' ' {
                ending = read_u8(reader).await?;
            }
            if ending != b'\n' {
                return Err(RelpFrameError::InvalidTrailer(ending));
            }
            Vec::new()
        } else {
            let token = read_token(reader, DATA_LEN_STRING_MAX_SIZE).await?;
            let data_len = match usize::from_radix_10_checked(&token) {
                (Some(len), used_len) if used_len == token.len() => len,
                _ => return Err(RelpFrameError::InvalidDataLen),
            };
            if data_len > DATA_MAX_SIZE {
                return Err(RelpFrameError::OversizedData(data_len));
            }
            let mut data = vec![0u8; data_len];
            reader.read_exact(&mut data).await.map_err(map_read_err)?;
            let ending = read_u8(reader).await?;
            if ending != b'\n' {
                return Err(RelpFrameError::InvalidTrailer(ending));
            }
            data
        };

        Ok(RelpFrame { txn, command, data })
    }
}

async fn read_token<R>(reader: &mut R, max_size: usize) -> Result<Vec<u8>, RelpFrameError>
where
    R: AsyncBufRead + Unpin,
{
    let mut token = Vec::with_capacity(max_size);
    loop {
        let b = read_u8(reader).await?;
        if b == b' ' {
            return if token.is_empty() {
                Err(RelpFrameError::EmptyHeaderField)
            } else {
                Ok(token)
            };
        }
        if token.len() >= max_size {
            return Err(RelpFrameError::OversizedHeaderField);
        }
        token.push(b);
    }
}

async fn read_u8<R>(reader: &mut R) -> Result<u8, RelpFrameError>
where
    R: AsyncBufRead + Unpin,
{
    reader.read_u8().await.map_err(map_read_err)
}

async fn peek_u8<R>(reader: &mut R) -> Result<u8, RelpFrameError>
where
    R: AsyncBufRead + Unpin,
{
    let buf = reader.fill_buf().await.map_err(map_read_err)?;
    buf.first().copied().ok_or(RelpFrameError::ConnectionClosed)
}

fn map_read_err(e: io::Error) -> RelpFrameError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        RelpFrameError::ConnectionClosed
    } else {
        RelpFrameError::ReadFailed(e)
    }
}
