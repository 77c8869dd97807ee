/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// syslog facility codes, already shifted into their priority position
#[allow(unused)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facility {
    // kernel messages (these can't be generated from user processes)
    Kern = 0 << 3,
    // generic user-level messages
    User = 1 << 3,
    // mail subsystem
    Mail = 2 << 3,
    // system daemons without separate facility value
    Daemon = 3 << 3,
    // security/authorization messages
    Auth = 4 << 3,
    // messages generated internally by syslogd(8)
    Syslog = 5 << 3,
    // line printer subsystem
    Lpr = 6 << 3,
    // USENET news subsystem
    News = 7 << 3,
    // UUCP subsystem
    Uucp = 8 << 3,
    // clock daemon (cron and at)
    Cron = 9 << 3,
    // security/authorization messages (private)
    AuthPrivate = 10 << 3,
    // ftp daemon
    Ftp = 11 << 3,
    Local0 = 16 << 3,
    Local1 = 17 << 3,
    Local2 = 18 << 3,
    Local3 = 19 << 3,
    Local4 = 20 << 3,
    Local5 = 21 << 3,
    Local6 = 22 << 3,
    Local7 = 23 << 3,
}

/// the eight standard syslog severity levels, most urgent first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    // system is unusable
    Emergency = 0,
    // action must be taken immediately
    Alert = 1,
    // critical conditions
    Critical = 2,
    // error conditions
    Error = 3,
    // warning conditions
    Warning = 4,
    // normal, but significant, condition
    Notice = 5,
    // informational message
    Info = 6,
    // debug-level message
    Debug = 7,
}

pub type Priority = u8;

pub(crate) fn encode_priority(severity: Severity, facility: Facility) -> Priority {
    facility as u8 | severity as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_priority_combinations() {
        assert_eq!(encode_priority(Severity::Emergency, Facility::Kern), 0);
        assert_eq!(encode_priority(Severity::Info, Facility::User), 14);
        assert_eq!(encode_priority(Severity::Error, Facility::Daemon), 27);
        assert_eq!(encode_priority(Severity::Warning, Facility::AuthPrivate), 84);
        assert_eq!(encode_priority(Severity::Debug, Facility::Local7), 191);
    }
}
