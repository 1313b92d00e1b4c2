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

//! Integration tests exercising [`UPTransportZenoh`] end to end over a real
//! (loopback, default-configured) overlay session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use up_transport_zenoh::{
    UListener, UMessage, UMessageBuilder, UPayloadFormat, UPTransportZenoh, UTransport, UUri,
    ZenohTransportConfig,
};

fn topic() -> UUri {
    UUri {
        authority_name: "test-vehicle".to_string(),
        ue_id: 0x1001,
        ue_version_major: 1,
        resource_id: 0x8001,
    }
}

fn method() -> UUri {
    UUri {
        authority_name: "test-vehicle".to_string(),
        ue_id: 0x1002,
        ue_version_major: 1,
        resource_id: 0x0003,
    }
}

fn reply_to() -> UUri {
    UUri {
        authority_name: "test-client".to_string(),
        ue_id: 0x2001,
        ue_version_major: 1,
        resource_id: 0,
    }
}

struct NotifyOnReceive {
    received: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

#[async_trait]
impl UListener for NotifyOnReceive {
    async fn on_receive(&self, _message: UMessage) {
        self.received.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }
}

struct CapturingListener {
    received: Arc<std::sync::Mutex<Option<UMessage>>>,
    notify: Arc<Notify>,
}

#[async_trait]
impl UListener for CapturingListener {
    async fn on_receive(&self, message: UMessage) {
        *self.received.lock().unwrap() = Some(message);
        self.notify.notify_one();
    }
}

#[tokio::test]
async fn publish_is_delivered_to_a_registered_subscriber() {
    let transport = UPTransportZenoh::new(ZenohTransportConfig::new("test-vehicle"), topic())
        .await
        .expect("overlay session opens");

    let received = Arc::new(AtomicBool::new(false));
    let notify = Arc::new(Notify::new());
    let listener = Arc::new(NotifyOnReceive {
        received: received.clone(),
        notify: notify.clone(),
    });

    transport.register_listener(&topic(), None, listener.clone()).await.unwrap();

    let message = UMessageBuilder::publish(topic())
        .build_with_payload(&b"hello"[..], UPayloadFormat::Text)
        .unwrap();
    transport.send(message).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), notify.notified()).await.expect("message is delivered in time");
    assert!(received.load(Ordering::SeqCst));

    transport.unregister_listener(&topic(), None, listener).await.unwrap();
}

#[tokio::test]
async fn unregistering_with_an_unspecified_local_authority_uses_the_same_key_as_registering() {
    // the filter's own authority is empty; the key mapper substitutes the
    // transport's local authority for both register and unregister, so the
    // two calls must agree on the resulting overlay key (see DESIGN.md for
    // the asymmetric-call-shape bug this regression test pins).
    let transport = UPTransportZenoh::new(ZenohTransportConfig::new("test-vehicle"), topic())
        .await
        .expect("overlay session opens");

    let filter = UUri {
        authority_name: String::new(),
        ..topic()
    };
    let listener = Arc::new(NotifyOnReceive {
        received: Arc::new(AtomicBool::new(false)),
        notify: Arc::new(Notify::new()),
    });

    transport.register_listener(&filter, None, listener.clone()).await.unwrap();
    transport.unregister_listener(&filter, None, listener).await.unwrap();
}

#[tokio::test]
async fn rpc_request_is_answered_by_a_registered_queryable() {
    let service = UPTransportZenoh::new(ZenohTransportConfig::new("test-vehicle"), method())
        .await
        .expect("overlay session opens");
    let client = UPTransportZenoh::new(ZenohTransportConfig::new("test-vehicle"), reply_to())
        .await
        .expect("overlay session opens");
    let service = Arc::new(service);

    struct EchoService {
        transport: Arc<UPTransportZenoh>,
    }

    #[async_trait]
    impl UListener for EchoService {
        async fn on_receive(&self, msg: UMessage) {
            let attrs = msg.attributes();
            let response = UMessageBuilder::response(attrs.source.clone(), attrs.id, method())
                .build_with_payload(msg.payload().cloned().unwrap_or_default(), UPayloadFormat::Text)
                .unwrap();
            self.transport.send(response).await.unwrap();
        }
    }

    let echo = Arc::new(EchoService {
        transport: service.clone(),
    });
    service.register_listener(&reply_to(), Some(&method()), echo.clone()).await.unwrap();

    let received = Arc::new(std::sync::Mutex::new(None));
    let notify = Arc::new(Notify::new());
    let response_listener = Arc::new(CapturingListener {
        received: received.clone(),
        notify: notify.clone(),
    });
    client
        .register_listener(&method(), Some(&reply_to()), response_listener.clone())
        .await
        .unwrap();

    let request = UMessageBuilder::request(method(), reply_to(), 5_000)
        .build_with_payload(&b"ping"[..], UPayloadFormat::Text)
        .unwrap();
    let request_id = request.attributes().id;
    client.send(request).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), notify.notified()).await.expect("response is delivered in time");
    let response = received.lock().unwrap().take().expect("response was captured");
    assert_eq!(response.attributes().reqid, Some(request_id));

    client.unregister_listener(&method(), Some(&reply_to()), response_listener).await.unwrap();
    service.unregister_listener(&reply_to(), Some(&method()), echo).await.unwrap();
}

#[tokio::test]
async fn close_drops_registered_listeners() {
    let transport = UPTransportZenoh::new(ZenohTransportConfig::new("test-vehicle"), topic())
        .await
        .expect("overlay session opens");

    let listener = Arc::new(NotifyOnReceive {
        received: Arc::new(AtomicBool::new(false)),
        notify: Arc::new(Notify::new()),
    });
    transport.register_listener(&topic(), None, listener.clone()).await.unwrap();

    transport.close();

    // the registration is gone, so unregistering the same listener again is a no-op failure
    assert!(transport.unregister_listener(&topic(), None, listener).await.is_err());
}
