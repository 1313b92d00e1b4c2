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

//! The [`UPTransportZenoh`] facade: a [`UTransport`] implementation backed by
//! a Zenoh session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};
use zenoh::bytes::ZBytes;
use zenoh::config::Config;
use zenoh::qos::Priority as ZPriority;
use zenoh::query::{QueryTarget, Reply};
use zenoh::sample::Sample;
use zenoh::Session;

use crate::transport::attachment::{decode_wire, encode_wire};
use crate::transport::classifier::{classify, MessageKind};
use crate::transport::config::ZenohTransportConfig;
use crate::transport::error::ZenohTransportError;
use crate::transport::key::to_overlay_key;
use crate::transport::registry::{PendingReply, Registry};
use crate::utransport::{ComparableListener, LocalUriProvider, UListener, UTransport};
use crate::{UAttributes, UAttributesValidators, UCode, UMessage, UMessageType, UPriority, UStatus, UUri};

fn map_zenoh_priority(priority: UPriority) -> ZPriority {
    match priority {
        UPriority::Cs0 => ZPriority::Background,
        UPriority::Unspecified | UPriority::Cs1 => ZPriority::DataLow,
        UPriority::Cs2 => ZPriority::Data,
        UPriority::Cs3 => ZPriority::DataHigh,
        UPriority::Cs4 => ZPriority::InteractiveLow,
        UPriority::Cs5 => ZPriority::InteractiveHigh,
        UPriority::Cs6 => ZPriority::RealTime,
    }
}

fn zbytes_to_vec(bytes: &ZBytes) -> Vec<u8> {
    bytes.to_bytes().into_owned()
}

fn decode_sample(sample: &Sample) -> Result<UMessage, UStatus> {
    let attachment = sample
        .attachment()
        .ok_or_else(|| UStatus::fail_with_code(UCode::Internal, "overlay sample is missing its attachment"))?;
    let attributes = decode_wire(&zbytes_to_vec(attachment))
        .map_err(|e| UStatus::fail_with_code(UCode::InvalidArgument, e.to_string()))?;
    let payload = Bytes::from(zbytes_to_vec(sample.payload()));
    Ok(UMessage::new(attributes, Some(payload)))
}

fn decode_reply(reply: &Reply) -> Result<UMessage, UStatus> {
    let sample = reply
        .result()
        .map_err(|e| UStatus::fail_with_code(UCode::Internal, format!("overlay reply carries an error: {e:?}")))?;
    decode_sample(sample)
}

struct ZenohPendingReply {
    query: zenoh::query::Query,
}

#[async_trait]
impl PendingReply for ZenohPendingReply {
    async fn reply(self: Box<Self>, payload: Bytes, attachment: Vec<u8>) -> Result<(), UStatus> {
        self.query
            .reply(self.query.key_expr().clone(), payload)
            .attachment(ZBytes::from(attachment))
            .await
            .map_err(|e| UStatus::fail_with_code(UCode::Internal, format!("unable to reply with overlay: {e}")))
    }
}

/// A uProtocol transport implementation that exchanges messages over a
/// Zenoh pub/sub and query overlay.
pub struct UPTransportZenoh {
    session: Session,
    source: UUri,
    config: ZenohTransportConfig,
    registry: Arc<Registry>,
}

impl UPTransportZenoh {
    /// Opens a Zenoh session per `config` and builds a transport whose local
    /// uEntity is identified by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`UCode::Internal`] if the overlay session cannot be opened.
    pub async fn new(config: ZenohTransportConfig, source: UUri) -> Result<Self, UStatus> {
        let zenoh_config = match &config.session_config_json5 {
            Some(json5) => {
                Config::from_json5(json5).map_err(|e| ZenohTransportError::SessionSetup(e.to_string()))?
            }
            None => Config::default(),
        };
        let session = zenoh::open(zenoh_config)
            .await
            .map_err(|e| ZenohTransportError::SessionSetup(e.to_string()))?;
        debug!("opened overlay session for authority {}", config.local_authority);
        Ok(UPTransportZenoh {
            session,
            source,
            config,
            registry: Arc::new(Registry::new()),
        })
    }

    /// Tears down this transport's bookkeeping: every registered listener,
    /// RPC callback, and in-flight query is dropped. The overlay session
    /// itself is closed when the transport is dropped.
    pub fn close(&self) {
        self.registry.clear();
    }

    fn local_authority(&self) -> &str {
        &self.config.local_authority
    }

    async fn send_publish_or_notification(&self, key: &str, payload: Bytes, attributes: &UAttributes) -> Result<(), UStatus> {
        let wire = encode_wire(attributes).map_err(|e| UStatus::fail_with_code(UCode::InvalidArgument, e.to_string()))?;
        self.session
            .put(key, payload)
            .attachment(ZBytes::from(wire))
            .priority(map_zenoh_priority(attributes.priority))
            .await
            .map_err(|e| UStatus::fail_with_code(UCode::Internal, format!("unable to send with overlay: {e}")))
    }

    async fn send_request(&self, key: &str, payload: Bytes, attributes: &UAttributes) -> Result<(), UStatus> {
        if self.registry.matching_response(key).is_none() {
            return Err(UStatus::fail_with_code(UCode::Internal, "no response callback registered for this request"));
        }
        let wire = encode_wire(attributes).map_err(|e| UStatus::fail_with_code(UCode::InvalidArgument, e.to_string()))?;
        let timeout = attributes
            .ttl
            .map(|ttl| Duration::from_millis(u64::from(ttl)))
            .unwrap_or(self.config.default_rpc_timeout);

        let replies = self
            .session
            .get(key)
            .payload(payload)
            .attachment(ZBytes::from(wire))
            .target(QueryTarget::BestMatching)
            .timeout(timeout)
            .await
            .map_err(|e| UStatus::fail_with_code(UCode::Internal, format!("unable to issue overlay query: {e}")))?;

        let registry = self.registry.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            while let Ok(reply) = replies.recv_async().await {
                if reply.result().is_err() {
                    debug!("overlay reply stream for {key} carried an error, waiting for the next one");
                    continue;
                }
                let Some(listener) = registry.matching_response(&key) else {
                    warn!("reply arrived for {key} after its response listener was unregistered");
                    break;
                };
                match decode_reply(&reply) {
                    Ok(message) => listener.on_receive(message).await,
                    Err(e) => warn!("failed to decode overlay reply for {key}: {e}"),
                }
                break;
            }
        });

        Ok(())
    }

    async fn send_response(&self, payload: Bytes, attributes: &UAttributes) -> Result<(), UStatus> {
        let reqid = attributes
            .reqid
            .ok_or_else(|| UStatus::fail_with_code(UCode::InvalidArgument, "response messages require a reqid"))?;
        let query = self
            .registry
            .take_query(&reqid)
            .ok_or_else(|| UStatus::fail_with_code(UCode::Internal, "query doesn't exist"))?;
        let wire = encode_wire(attributes).map_err(|e| UStatus::fail_with_code(UCode::InvalidArgument, e.to_string()))?;
        query.reply(payload, wire).await
    }

    async fn install_subscriber(&self, key: &str, listener: ComparableListener) -> Result<(), UStatus> {
        let dispatched = listener.clone();
        let subscriber = self
            .session
            .declare_subscriber(key)
            .callback(move |sample: Sample| {
                let dispatched = dispatched.clone();
                tokio::spawn(async move {
                    match decode_sample(&sample) {
                        Ok(message) => dispatched.on_receive(message).await,
                        Err(e) => warn!("failed to decode overlay sample: {e}"),
                    }
                });
            })
            .await
            .map_err(|e| UStatus::fail_with_code(UCode::Internal, format!("unable to register callback with overlay: {e}")))?;

        if !self.registry.insert_subscriber(key, listener, Arc::new(subscriber)) {
            return Err(UStatus::fail_with_code(UCode::AlreadyExists, "listener is already registered for these filters"));
        }
        Ok(())
    }

    async fn install_queryable(&self, key: &str, listener: ComparableListener) -> Result<(), UStatus> {
        let dispatched = listener.clone();
        let registry = self.registry.clone();
        let queryable = self
            .session
            .declare_queryable(key)
            .callback(move |query: zenoh::query::Query| {
                let dispatched = dispatched.clone();
                let registry = registry.clone();
                tokio::spawn(async move {
                    let Some(attachment) = query.attachment() else {
                        warn!("overlay query is missing its attachment");
                        return;
                    };
                    let attributes = match decode_wire(&zbytes_to_vec(attachment)) {
                        Ok(attributes) => attributes,
                        Err(e) => {
                            warn!("failed to decode overlay query attachment: {e}");
                            return;
                        }
                    };
                    let payload = query.payload().map(|p| Bytes::from(zbytes_to_vec(p)));
                    let request_id = attributes.id;
                    let message = UMessage::new(attributes, payload);
                    registry.remember_query(request_id, Box::new(ZenohPendingReply { query }));
                    dispatched.on_receive(message).await;
                });
            })
            .await
            .map_err(|e| UStatus::fail_with_code(UCode::Internal, format!("unable to register callback with overlay: {e}")))?;

        if !self.registry.insert_queryable(key, listener, Arc::new(queryable)) {
            return Err(UStatus::fail_with_code(UCode::AlreadyExists, "listener is already registered for these filters"));
        }
        Ok(())
    }
}

#[async_trait]
impl UTransport for UPTransportZenoh {
    async fn send(&self, message: UMessage) -> Result<(), UStatus> {
        let (attributes, payload) = message.into_parts();
        if attributes.source.is_empty() {
            return Err(UStatus::fail_with_code(UCode::InvalidArgument, "attributes.source must not be empty"));
        }
        UAttributesValidators::get_validator_for_attributes(&attributes)
            .and_then(|v| v.validate(&attributes))
            .map_err(|e| UStatus::fail_with_code(UCode::InvalidArgument, e.to_string()))?;

        let key = to_overlay_key(self.local_authority(), &attributes.source, attributes.sink.as_ref());
        let payload = payload.unwrap_or_default();

        match attributes.type_ {
            UMessageType::Publish | UMessageType::Notification => {
                self.send_publish_or_notification(&key, payload, &attributes).await
            }
            UMessageType::Request => self.send_request(&key, payload, &attributes).await,
            UMessageType::Response => self.send_response(payload, &attributes).await,
            UMessageType::Unspecified => Err(UStatus::fail_with_code(UCode::InvalidArgument, "message type is unspecified")),
        }
    }

    async fn register_listener(
        &self,
        source_filter: &UUri,
        sink_filter: Option<&UUri>,
        listener: Arc<dyn UListener>,
    ) -> Result<(), UStatus> {
        let kind = classify(source_filter.resource_id, sink_filter.map(|s| s.resource_id));
        if kind.is_empty() {
            return Err(UStatus::fail_with_code(
                UCode::InvalidArgument,
                "source/sink filter pair does not match any known message kind",
            ));
        }
        let listener = ComparableListener::new(listener);

        if kind.contains(MessageKind::REQUEST) {
            let key = to_overlay_key(self.local_authority(), source_filter, sink_filter);
            return self.install_queryable(&key, listener).await;
        }
        if kind.contains(MessageKind::RESPONSE) {
            let Some(sink_filter) = sink_filter else {
                return Err(UStatus::fail_with_code(UCode::InvalidArgument, "sink should not be empty for response listeners"));
            };
            let key = to_overlay_key(self.local_authority(), sink_filter, Some(source_filter));
            self.registry.insert_response(&key, listener);
            return Ok(());
        }
        let key = to_overlay_key(self.local_authority(), source_filter, sink_filter);
        self.install_subscriber(&key, listener).await
    }

    async fn unregister_listener(
        &self,
        source_filter: &UUri,
        sink_filter: Option<&UUri>,
        listener: Arc<dyn UListener>,
    ) -> Result<(), UStatus> {
        let kind = classify(source_filter.resource_id, sink_filter.map(|s| s.resource_id));
        if kind.is_empty() {
            return Err(UStatus::fail_with_code(
                UCode::InvalidArgument,
                "source/sink filter pair does not match any known message kind",
            ));
        }
        let listener = ComparableListener::new(listener);

        if kind.contains(MessageKind::REQUEST) {
            let key = to_overlay_key(self.local_authority(), source_filter, sink_filter);
            return if self.registry.take_queryable(&key, &listener) {
                Ok(())
            } else {
                Err(UStatus::fail_with_code(UCode::NotFound, "RPC request listener doesn't exist"))
            };
        }
        if kind.contains(MessageKind::RESPONSE) {
            let Some(sink_filter) = sink_filter else {
                return Err(UStatus::fail_with_code(UCode::InvalidArgument, "sink should not be empty for response listeners"));
            };
            let key = to_overlay_key(self.local_authority(), sink_filter, Some(source_filter));
            return if self.registry.take_response(&key, &listener) {
                Ok(())
            } else {
                Err(UStatus::fail_with_code(UCode::NotFound, "RPC response callback doesn't exist"))
            };
        }
        let key = to_overlay_key(self.local_authority(), source_filter, sink_filter);
        if self.registry.take_subscriber(&key, &listener) {
            Ok(())
        } else {
            Err(UStatus::fail_with_code(UCode::NotFound, "listener not registered for these filters"))
        }
    }
}

impl LocalUriProvider for UPTransportZenoh {
    fn get_authority(&self) -> String {
        self.source.authority_name.clone()
    }

    fn get_resource_uri(&self, resource_id: u16) -> UUri {
        UUri {
            resource_id: u32::from(resource_id),
            ..self.source.clone()
        }
    }

    fn get_source_uri(&self) -> UUri {
        self.source.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_mapping_follows_the_documented_table() {
        assert_eq!(map_zenoh_priority(UPriority::Cs0), ZPriority::Background);
        assert_eq!(map_zenoh_priority(UPriority::Unspecified), ZPriority::DataLow);
        assert_eq!(map_zenoh_priority(UPriority::Cs1), ZPriority::DataLow);
        assert_eq!(map_zenoh_priority(UPriority::Cs6), ZPriority::RealTime);
    }
}
