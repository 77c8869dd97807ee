/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::warn;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::backend::{SyslogBackend, SyslogBackendBuilder};
use crate::buffer::{BufferRecord, RecordBuffer};
use crate::format::SyslogHeader;
use crate::stats::SendStats;
use crate::types::{Facility, Severity};
use crate::{BufferError, ShutdownError};

const DIAL_RETRY_INTERVAL: Duration = Duration::from_secs(1);
const SHUTDOWN_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct SyslogSenderConfig {
    pub(crate) backend: SyslogBackendBuilder,
    pub(crate) ident: String,
    pub(crate) facility: Facility,
    pub(crate) hostname: Option<String>,
    pub(crate) buffer_capacity: usize,
    pub(crate) flush_period: Duration,
    pub(crate) max_records_per_flush: usize,
    pub(crate) thread_name: String,
}

impl SyslogSenderConfig {
    pub fn new(backend: SyslogBackendBuilder, ident: &str) -> Self {
        SyslogSenderConfig {
            backend,
            ident: ident.to_string(),
            facility: Facility::User,
            hostname: None,
            buffer_capacity: 1024,
            flush_period: Duration::from_millis(100),
            max_records_per_flush: 128,
            thread_name: "syslog-send".to_string(),
        }
    }

    pub fn set_facility(&mut self, facility: Facility) {
        self.facility = facility;
    }

    pub fn set_hostname(&mut self, hostname: String) {
        self.hostname = Some(hostname);
    }

    pub fn set_buffer_capacity(&mut self, capacity: usize) {
        self.buffer_capacity = capacity;
    }

    pub fn set_flush_period(&mut self, period: Duration) {
        self.flush_period = period;
    }

    pub fn set_max_records_per_flush(&mut self, max: usize) {
        self.max_records_per_flush = max;
    }

    pub fn set_thread_name(&mut self, name: &str) {
        self.thread_name = name.to_string();
    }
}

enum SenderCommand {
    Quit,
}

/// Owner of the record buffer and the send thread.
///
/// Producers queue records through cloneable [`SyslogHandle`]s; one
/// dedicated thread drains the buffer on a fixed period and dispatches
/// each batch over one freshly built backend session.
pub struct SyslogSender {
    buffer: Arc<RecordBuffer>,
    stats: Arc<SendStats>,
    ctl_sender: mpsc::UnboundedSender<SenderCommand>,
    done_receiver: flume::Receiver<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl SyslogSender {
    pub fn spawn(config: SyslogSenderConfig) -> io::Result<SyslogSender> {
        let buffer = Arc::new(RecordBuffer::new(config.buffer_capacity));
        let stats = Arc::new(SendStats::default());
        let (ctl_sender, ctl_receiver) = mpsc::unbounded_channel();
        let (done_sender, done_receiver) = flume::bounded(1);

        let header = SyslogHeader {
            facility: config.facility,
            hostname: config.hostname.clone().or_else(crate::util::hostname),
            tag: config.ident.clone(),
            pid: std::process::id(),
        };

        let io_task = SenderIoTask {
            header,
            buffer: Arc::clone(&buffer),
            stats: Arc::clone(&stats),
            backend_builder: config.backend.clone(),
            ctl_receiver,
            flush_period: config.flush_period,
            max_records_per_flush: config.max_records_per_flush,
            line_buf: Vec::with_capacity(1024),
            quit: false,
        };

        let thread_handle = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                rt.block_on(io_task.run_to_end());
                let _ = done_sender.send(());
            })?;

        Ok(SyslogSender {
            buffer,
            stats,
            ctl_sender,
            done_receiver,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn get_handle(&self) -> SyslogHandle {
        SyslogHandle {
            buffer: Arc::clone(&self.buffer),
            stats: Arc::clone(&self.stats),
        }
    }

    pub fn get_stats(&self) -> Arc<SendStats> {
        Arc::clone(&self.stats)
    }

    /// Ask the send thread to drain everything still queued and stop.
    ///
    /// Blocks until the thread reports completion or the internal timeout
    /// elapses; on timeout the thread is left to finish its final drain
    /// detached and no further synchronization is offered.
    pub fn shutdown(&mut self) -> Result<(), ShutdownError> {
        let Some(handle) = self.thread_handle.take() else {
            return Ok(());
        };
        let _ = self.ctl_sender.send(SenderCommand::Quit);
        match self.done_receiver.recv_timeout(SHUTDOWN_WAIT_TIMEOUT) {
            Ok(_) | Err(flume::RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                Ok(())
            }
            Err(flume::RecvTimeoutError::Timeout) => Err(ShutdownError::Timeout),
        }
    }
}

impl Drop for SyslogSender {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            if let Err(e) = self.shutdown() {
                warn!("failed to stop syslog send thread: {e}");
            }
        }
    }
}

/// Cheap cloneable producer handle.
#[derive(Clone)]
pub struct SyslogHandle {
    buffer: Arc<RecordBuffer>,
    stats: Arc<SendStats>,
}

impl SyslogHandle {
    /// Queue one record without blocking; a full buffer rejects the
    /// record immediately.
    pub fn send(&self, severity: Severity, message: String) -> Result<(), BufferError> {
        self.stats.io.add_total();
        match self.buffer.add(BufferRecord::new(severity, message)) {
            Ok(_) => Ok(()),
            Err(e) => {
                self.stats.drop.add_buffer_full();
                Err(e)
            }
        }
    }

    pub fn emergency(&self, message: String) {
        self.log_with(Severity::Emergency, message)
    }

    pub fn alert(&self, message: String) {
        self.log_with(Severity::Alert, message)
    }

    pub fn critical(&self, message: String) {
        self.log_with(Severity::Critical, message)
    }

    pub fn error(&self, message: String) {
        self.log_with(Severity::Error, message)
    }

    pub fn warning(&self, message: String) {
        self.log_with(Severity::Warning, message)
    }

    pub fn notice(&self, message: String) {
        self.log_with(Severity::Notice, message)
    }

    pub fn info(&self, message: String) {
        self.log_with(Severity::Info, message)
    }

    pub fn debug(&self, message: String) {
        self.log_with(Severity::Debug, message)
    }

    fn log_with(&self, severity: Severity, message: String) {
        if let Err(e) = self.send(severity, message) {
            warn!("failed to queue syslog record: {e}");
        }
    }
}

struct SenderIoTask {
    header: SyslogHeader,
    buffer: Arc<RecordBuffer>,
    stats: Arc<SendStats>,
    backend_builder: SyslogBackendBuilder,
    ctl_receiver: mpsc::UnboundedReceiver<SenderCommand>,
    flush_period: Duration,
    max_records_per_flush: usize,
    line_buf: Vec<u8>,
    quit: bool,
}

impl SenderIoTask {
    async fn run_to_end(mut self) {
        let mut interval =
            tokio::time::interval_at(Instant::now() + self.flush_period, self.flush_period);
        // ticks skipped while a dispatch is in flight are not replayed
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.quit {
            tokio::select! {
                r = self.ctl_receiver.recv() => {
                    match r {
                        Some(SenderCommand::Quit) | None => self.quit = true,
                    }
                }
                _ = interval.tick() => {
                    let batch = self.take_batch(self.max_records_per_flush);
                    self.dispatch(batch).await;
                }
            }
        }

        // one final drain without the per-flush cap
        let batch = self.take_batch(usize::MAX);
        self.dispatch(batch).await;
    }

    fn take_batch(&self, max: usize) -> Vec<BufferRecord> {
        let mut records = Vec::with_capacity(self.buffer.len().min(max));
        while records.len() < max && !self.buffer.is_empty() {
            match self.buffer.remove() {
                Ok(r) => records.push(r),
                // whatever a racing producer inserts from here on is for
                // the next flush
                Err(_) => break,
            }
        }
        records
    }

    async fn dispatch(&mut self, records: Vec<BufferRecord>) {
        if records.is_empty() {
            return;
        }

        let Some(mut backend) = self.connect_backend().await else {
            self.stats.drop.add_peer_unreachable_n(records.len());
            return;
        };

        for record in &records {
            match backend
                .send_record(&self.header, record, &mut self.line_buf)
                .await
            {
                Ok(size) => {
                    self.stats.io.add_passed();
                    self.stats.io.add_size(size);
                }
                Err(e) => {
                    self.stats.drop.add_write_failed();
                    warn!("failed to send syslog record: {e:?}");
                }
            }
        }
        backend.close().await;
    }

    /// Dial one session, retrying on a fixed interval until the session
    /// is up or the loop has been told to quit. The first attempt always
    /// runs, so a shutdown drain against a healthy peer still delivers.
    async fn connect_backend(&mut self) -> Option<SyslogBackend> {
        loop {
            match self.backend_builder.build().await {
                Ok(backend) => return Some(backend),
                Err(e) => {
                    warn!("failed to connect syslog backend: {e:?}");
                    if self.quit {
                        return None;
                    }
                }
            }
            tokio::select! {
                r = self.ctl_receiver.recv() => {
                    match r {
                        Some(SenderCommand::Quit) | None => self.quit = true,
                    }
                }
                _ = tokio::time::sleep(DIAL_RETRY_INTERVAL) => {}
            }
        }
    }
}
