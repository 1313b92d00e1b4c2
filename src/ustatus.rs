/********************************************************************************
 * Copyright (c) 2023 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Status codes reported at the public boundary of this crate.
///
/// This mirrors the subset of the uProtocol status vocabulary that this
/// transport implementation actually produces or consumes; it is not a
/// transcription of the full upstream `google.rpc.Code` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UCode {
    Ok,
    #[default]
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    Unimplemented,
    Internal,
    Unavailable,
}

impl Display for UCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UCode::Ok => "OK",
            UCode::Unknown => "UNKNOWN",
            UCode::InvalidArgument => "INVALID_ARGUMENT",
            UCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            UCode::NotFound => "NOT_FOUND",
            UCode::AlreadyExists => "ALREADY_EXISTS",
            UCode::Unimplemented => "UNIMPLEMENTED",
            UCode::Internal => "INTERNAL",
            UCode::Unavailable => "UNAVAILABLE",
        };
        f.write_str(s)
    }
}

/// A status, consisting of a [`UCode`] and an optional human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UStatus {
    code: UCode,
    message: Option<String>,
}

impl UStatus {
    /// Creates a status indicating success.
    pub fn ok() -> Self {
        UStatus {
            code: UCode::Ok,
            message: None,
        }
    }

    /// Creates a failed status carrying [`UCode::Unknown`] and the given message.
    pub fn fail(message: impl Into<String>) -> Self {
        UStatus {
            code: UCode::Unknown,
            message: Some(message.into()),
        }
    }

    /// Creates a failed status carrying the given code and message.
    pub fn fail_with_code(code: UCode, message: impl Into<String>) -> Self {
        UStatus {
            code,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == UCode::Ok
    }

    pub fn is_failed(&self) -> bool {
        !self.is_success()
    }

    pub fn get_code(&self) -> UCode {
        self.code
    }

    pub fn get_message(&self) -> String {
        self.message.clone().unwrap_or_default()
    }
}

impl Display for UStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}: {}", self.code, self.get_message()))
    }
}

impl Error for UStatus {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_is_success() {
        let status = UStatus::ok();
        assert!(status.is_success());
        assert!(!status.is_failed());
        assert_eq!(status.get_code(), UCode::Ok);
        assert_eq!(status.get_message(), "");
    }

    #[test]
    fn fail_with_code_carries_message() {
        let status = UStatus::fail_with_code(UCode::NotFound, "no such listener");
        assert!(status.is_failed());
        assert_eq!(status.get_code(), UCode::NotFound);
        assert_eq!(status.get_message(), "no such listener");
    }

    #[test]
    fn fail_defaults_to_unknown() {
        let status = UStatus::fail("boom");
        assert_eq!(status.get_code(), UCode::Unknown);
    }
}
