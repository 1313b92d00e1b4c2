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

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use up_transport_zenoh::{
    UListener, UMessage, UMessageBuilder, UPayloadFormat, UPTransportZenoh, UTransport, UUri,
    ZenohTransportConfig,
};

struct ConsolePrinter;

#[async_trait]
impl UListener for ConsolePrinter {
    async fn on_receive(&self, msg: UMessage) {
        if let Some(payload) = msg.payload() {
            println!("received notification: {}", String::from_utf8_lossy(payload));
        }
    }
}

fn topic() -> UUri {
    UUri {
        authority_name: "my-vehicle".to_string(),
        ue_id: 0xa34b,
        ue_version_major: 1,
        resource_id: 0xd100,
    }
}

fn subscriber() -> UUri {
    UUri {
        authority_name: "my-vehicle".to_string(),
        ue_id: 0xa34b,
        ue_version_major: 1,
        resource_id: 0,
    }
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ZenohTransportConfig::new("my-vehicle");
    let transport = Arc::new(UPTransportZenoh::new(config, topic()).await?);

    let listener = Arc::new(ConsolePrinter);
    transport.register_listener(&topic(), Some(&subscriber()), listener.clone()).await?;

    let message = UMessageBuilder::notification(topic(), subscriber())
        .build_with_payload(&b"Hello"[..], UPayloadFormat::Text)?;
    transport.send(message).await?;

    tokio::time::sleep(Duration::from_millis(100)).await;

    transport.unregister_listener(&topic(), Some(&subscriber()), listener).await?;
    Ok(())
}
