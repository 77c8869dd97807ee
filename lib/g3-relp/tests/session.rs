/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Builder;

use g3_relp::{
    RelpClient, RelpClientConfig, RelpCommand, RelpConnectError, RelpFrame, RelpRequestError,
};

async fn send_rsp(stream: &mut BufStream<TcpStream>, txn: u64, data: &[u8]) {
    let mut buf = Vec::with_capacity(64);
    RelpFrame::encode_message(&mut buf, txn, RelpCommand::Rsp, data);
    stream.write_all(&buf).await.unwrap();
    stream.flush().await.unwrap();
}

/// serve one client session: ack the offer, ack and record every syslog
/// frame, stop on close or disconnect
async fn serve_session(stream: TcpStream, seen: &mut Vec<(u64, String)>) -> bool {
    let mut stream = BufStream::new(stream);
    loop {
        let frame = match RelpFrame::read(&mut stream).await {
            Ok(frame) => frame,
            Err(_) => return false,
        };
        match frame.command {
            RelpCommand::Open => {
                send_rsp(&mut stream, frame.txn, b"200 OK\nrelp_version=0\ncommands=syslog").await;
            }
            RelpCommand::Syslog => {
                seen.push((frame.txn, String::from_utf8_lossy(&frame.data).into_owned()));
                send_rsp(&mut stream, frame.txn, b"200 OK").await;
            }
            RelpCommand::Close => return true,
            _ => return false,
        }
    }
}

fn test_config(listener: &TcpListener) -> RelpClientConfig {
    let mut config = RelpClientConfig::new(listener.local_addr().unwrap());
    config.set_connect_timeout(Duration::from_secs(2));
    config
}

#[test]
fn open_send_close() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = test_config(&listener);

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut seen = Vec::new();
            let saw_close = serve_session(stream, &mut seen).await;
            (seen, saw_close)
        });

        let mut client = RelpClient::connect(config).await.unwrap();
        client.send_line(b"<14>first record").await.unwrap();
        client.send_line(b"<11>second record").await.unwrap();
        client.close().await;

        let (seen, saw_close) = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (2, "<14>first record".to_string()));
        assert_eq!(seen[1], (3, "<11>second record".to_string()));
        assert!(saw_close);
    });
}

#[test]
fn offer_rejected() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = test_config(&listener);

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufStream::new(stream);
            let frame = RelpFrame::read(&mut stream).await.unwrap();
            assert_eq!(frame.command, RelpCommand::Open);
            send_rsp(&mut stream, frame.txn, b"500 insufficient resources").await;
        });

        match RelpClient::connect(config).await {
            Err(RelpConnectError::OfferRejected(status)) => {
                assert!(status.starts_with("500"));
            }
            r => panic!("unexpected connect result: {:?}", r.err()),
        }
    });
}

#[test]
fn ack_txn_mismatch_rejected() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = test_config(&listener);

        let session_count = Arc::new(AtomicUsize::new(0));
        let server_sessions = Arc::clone(&session_count);
        tokio::spawn(async move {
            // ack every syslog frame with a shifted txn, on every session
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                server_sessions.fetch_add(1, Ordering::Relaxed);
                let mut stream = BufStream::new(stream);
                while let Ok(frame) = RelpFrame::read(&mut stream).await {
                    match frame.command {
                        RelpCommand::Open => send_rsp(&mut stream, frame.txn, b"200 OK").await,
                        RelpCommand::Syslog => {
                            send_rsp(&mut stream, frame.txn + 7, b"200 OK").await
                        }
                        _ => break,
                    }
                }
            }
        });

        let mut client = RelpClient::connect(config).await.unwrap();
        match client.send_line(b"<14>some record").await {
            Err(RelpRequestError::TxnMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 9);
            }
            r => panic!("unexpected send result: {:?}", r.err()),
        }
        // the failed write went through one reconnect before giving up
        assert_eq!(session_count.load(Ordering::Relaxed), 2);
    });
}

#[test]
fn reconnect_after_peer_close() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = test_config(&listener);

        let server = tokio::spawn(async move {
            // first session is dropped right after the open handshake
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufStream::new(stream);
            let frame = RelpFrame::read(&mut stream).await.unwrap();
            assert_eq!(frame.command, RelpCommand::Open);
            send_rsp(&mut stream, frame.txn, b"200 OK").await;
            drop(stream);

            // second session serves normally
            let (stream, _) = listener.accept().await.unwrap();
            let mut seen = Vec::new();
            serve_session(stream, &mut seen).await;
            seen
        });

        let mut client = RelpClient::connect(config).await.unwrap();
        client.send_line(b"<14>survives one peer close").await.unwrap();
        client.close().await;

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        // the txn counter restarts after the reconnect handshake
        assert_eq!(seen[0], (2, "<14>survives one peer close".to_string()));
    });
}
