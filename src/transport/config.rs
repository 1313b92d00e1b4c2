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

//! Configuration for a [`crate::UPTransportZenoh`] instance.

use std::time::Duration;

/// Settings controlling how a [`crate::UPTransportZenoh`] opens its overlay
/// session and dispatches RPC requests.
#[derive(Debug, Clone)]
pub struct ZenohTransportConfig {
    /// The uProtocol authority this transport's local uEntity is reachable at.
    pub local_authority: String,
    /// The Zenoh session configuration to open with, in its JSON5 form.
    ///
    /// `None` opens a session with Zenoh's own default configuration.
    pub session_config_json5: Option<String>,
    /// How long a [`crate::UPTransportZenoh::send`] of a request message
    /// waits for a matching response before the query is abandoned, absent
    /// an explicit per-message TTL.
    pub default_rpc_timeout: Duration,
}

impl Default for ZenohTransportConfig {
    fn default() -> Self {
        ZenohTransportConfig {
            local_authority: String::new(),
            session_config_json5: None,
            default_rpc_timeout: Duration::from_millis(10_000),
        }
    }
}

impl ZenohTransportConfig {
    /// Creates a configuration for the given local authority, using Zenoh's
    /// default session configuration and a 10 second RPC timeout.
    pub fn new(local_authority: impl Into<String>) -> Self {
        ZenohTransportConfig {
            local_authority: local_authority.into(),
            ..Default::default()
        }
    }

    pub fn with_session_config_json5(mut self, json5: impl Into<String>) -> Self {
        self.session_config_json5 = Some(json5.into());
        self
    }

    pub fn with_default_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.default_rpc_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_10_second_rpc_timeout() {
        let config = ZenohTransportConfig::new("vehicle");
        assert_eq!(config.default_rpc_timeout, Duration::from_millis(10_000));
        assert!(config.session_config_json5.is_none());
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = ZenohTransportConfig::new("vehicle")
            .with_session_config_json5("{}")
            .with_default_rpc_timeout(Duration::from_secs(1));
        assert_eq!(config.session_config_json5.as_deref(), Some("{}"));
        assert_eq!(config.default_rpc_timeout, Duration::from_secs(1));
    }
}
