/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::RelpCommand;

#[derive(Debug, Error)]
pub enum RelpFrameError {
    #[error("read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("invalid txn field")]
    InvalidTxn,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("invalid data length field")]
    InvalidDataLen,
    #[error("oversized data length {0}")]
    OversizedData(usize),
    #[error("empty header field")]
    EmptyHeaderField,
    #[error("oversized header field")]
    OversizedHeaderField,
    #[error("invalid trailer byte {0:#04x}")]
    InvalidTrailer(u8),
}

#[derive(Debug, Error)]
pub enum RelpConnectError {
    #[error("connect failed: {0:?}")]
    ConnectIoError(io::Error),
    #[error("timed out to connect")]
    ConnectTimedOut,
    #[error("failed to send offer: {0:?}")]
    SendOfferFailed(io::Error),
    #[error("invalid offer response: {0}")]
    InvalidOfferResponse(RelpFrameError),
    #[error("unexpected offer response: txn {txn} command {command}")]
    UnexpectedOfferResponse { txn: u64, command: RelpCommand },
    #[error("offer rejected by server: {0}")]
    OfferRejected(String),
}

#[derive(Debug, Error)]
pub enum RelpRequestError {
    #[error("session is not connected")]
    NotConnected,
    #[error("write failed: {0:?}")]
    WriteFailed(io::Error),
    #[error("invalid response frame: {0}")]
    InvalidResponse(RelpFrameError),
    #[error("unexpected response command {0}")]
    UnexpectedResponseCommand(RelpCommand),
    #[error("response txn {actual} does not match request txn {expected}")]
    TxnMismatch { expected: u64, actual: u64 },
    #[error("reconnect failed: {0}")]
    ReconnectFailed(RelpConnectError),
}
