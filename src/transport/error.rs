/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

use crate::{UCode, UStatus};

/// Errors specific to standing up or tearing down a [`crate::UPTransportZenoh`].
#[derive(Debug)]
pub enum ZenohTransportError {
    /// The overlay session could not be opened.
    SessionSetup(String),
    /// A `source_filter`/`sink_filter` pair does not describe any message
    /// kind this transport can register a listener for.
    UnroutableFilter,
}

impl std::fmt::Display for ZenohTransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionSetup(e) => f.write_fmt(format_args!("failed to open overlay session: {}", e)),
            Self::UnroutableFilter => {
                f.write_str("source/sink filter pair does not match any known message kind")
            }
        }
    }
}

impl std::error::Error for ZenohTransportError {}

impl From<ZenohTransportError> for UStatus {
    fn from(value: ZenohTransportError) -> Self {
        match value {
            ZenohTransportError::SessionSetup(_) => UStatus::fail_with_code(UCode::Internal, value.to_string()),
            ZenohTransportError::UnroutableFilter => {
                UStatus::fail_with_code(UCode::InvalidArgument, value.to_string())
            }
        }
    }
}
