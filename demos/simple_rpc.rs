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

//! Illustrates a minimal RPC exchange: a callee registers a queryable for a
//! method, a caller sends a request and registers a response listener for
//! its reply-to address, and the callee answers with a `send(RESPONSE)`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use up_transport_zenoh::{
    UListener, UMessage, UMessageBuilder, UPayloadFormat, UPTransportZenoh, UTransport, UUri,
    ZenohTransportConfig,
};

fn method() -> UUri {
    UUri {
        authority_name: "my-vehicle".to_string(),
        ue_id: 0xa34b,
        ue_version_major: 1,
        resource_id: 0x00a0,
    }
}

fn reply_to() -> UUri {
    UUri {
        authority_name: "my-vehicle".to_string(),
        ue_id: 0xa34c,
        ue_version_major: 1,
        resource_id: 0,
    }
}

struct EchoService {
    transport: Arc<UPTransportZenoh>,
}

#[async_trait]
impl UListener for EchoService {
    async fn on_receive(&self, msg: UMessage) {
        let attrs = msg.attributes();
        let response = UMessageBuilder::response(attrs.source.clone(), attrs.id, method())
            .build_with_payload(msg.payload().cloned().unwrap_or_default(), UPayloadFormat::Text)
            .expect("echoed attributes are always valid for a response");
        if let Err(e) = self.transport.send(response).await {
            eprintln!("failed to send echo response: {e}");
        }
    }
}

struct PrintOnReceive;

#[async_trait]
impl UListener for PrintOnReceive {
    async fn on_receive(&self, msg: UMessage) {
        if let Some(payload) = msg.payload() {
            println!("service echoed: {}", String::from_utf8_lossy(payload));
        }
    }
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let service_transport = Arc::new(UPTransportZenoh::new(ZenohTransportConfig::new("my-vehicle"), method()).await?);
    let client_transport = Arc::new(UPTransportZenoh::new(ZenohTransportConfig::new("my-vehicle"), reply_to()).await?);

    let echo = Arc::new(EchoService {
        transport: service_transport.clone(),
    });
    service_transport.register_listener(&reply_to(), Some(&method()), echo.clone()).await?;

    let response_listener = Arc::new(PrintOnReceive);
    client_transport
        .register_listener(&method(), Some(&reply_to()), response_listener.clone())
        .await?;

    let request = UMessageBuilder::request(method(), reply_to(), 5_000)
        .build_with_payload(&b"Hello"[..], UPayloadFormat::Text)?;
    client_transport.send(request).await?;

    tokio::time::sleep(Duration::from_millis(500)).await;

    client_transport
        .unregister_listener(&method(), Some(&reply_to()), response_listener)
        .await?;
    service_transport.unregister_listener(&reply_to(), Some(&method()), echo).await?;
    Ok(())
}
