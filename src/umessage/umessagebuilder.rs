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

use bytes::Bytes;

use crate::umessage::UMessageError;
use crate::{
    PublishValidator, RequestValidator, ResponseValidator, UAttributes, UAttributesValidator,
    UMessage, UMessageType, UPayloadFormat, UPriority, UUri, UUID,
};

/// A builder for creating [`UMessage`]s.
///
/// Each constructor pre-populates the attributes implied by the message type
/// it builds for; [`Self::build`] and [`Self::build_with_payload`] run the
/// matching [`UAttributesValidator`] before handing back a `UMessage`.
pub struct UMessageBuilder {
    validator: Box<dyn UAttributesValidator>,
    message_type: UMessageType,
    source: Option<UUri>,
    sink: Option<UUri>,
    priority: UPriority,
    ttl: Option<u32>,
    id: UUID,
    reqid: Option<UUID>,
    payload_format: UPayloadFormat,
}

impl UMessageBuilder {
    fn new(message_type: UMessageType, validator: Box<dyn UAttributesValidator>) -> Self {
        UMessageBuilder {
            validator,
            message_type,
            source: None,
            sink: None,
            priority: UPriority::Cs1,
            ttl: None,
            id: UUID::build(),
            reqid: None,
            payload_format: UPayloadFormat::Unspecified,
        }
    }

    /// Gets a builder for creating a *publish* message.
    ///
    /// A publish message notifies all interested consumers of an event.
    pub fn publish(topic: UUri) -> Self {
        let mut builder = Self::new(UMessageType::Publish, Box::new(PublishValidator));
        builder.source = Some(topic);
        builder
    }

    /// Gets a builder for creating a *notification* message.
    ///
    /// # Arguments
    ///
    /// * `topic` - The topic the notification is about.
    /// * `destination` - The URI identifying the specific consumer to notify.
    pub fn notification(topic: UUri, destination: UUri) -> Self {
        let mut builder = Self::new(UMessageType::Notification, Box::new(crate::NotificationValidator));
        builder.source = Some(topic);
        builder.sink = Some(destination);
        builder
    }

    /// Gets a builder for creating an RPC *request* message.
    ///
    /// # Arguments
    ///
    /// * `method_to_invoke` - The URI identifying the method to invoke.
    /// * `reply_to_address` - The URI the sender expects the response at.
    /// * `ttl` - Milliseconds after which the request should no longer be processed.
    pub fn request(method_to_invoke: UUri, reply_to_address: UUri, ttl: u32) -> Self {
        let mut builder = Self::new(UMessageType::Request, Box::new(RequestValidator));
        builder.source = Some(reply_to_address);
        builder.sink = Some(method_to_invoke);
        builder.ttl = Some(ttl);
        builder.priority = UPriority::Cs4;
        builder
    }

    /// Gets a builder for creating an RPC *response* message.
    ///
    /// # Arguments
    ///
    /// * `reply_to_address` - The URI to send the response to (the request's source).
    /// * `request_id` - The identifier of the request this message responds to.
    /// * `invoked_method` - The URI identifying the method that was invoked.
    pub fn response(reply_to_address: UUri, request_id: UUID, invoked_method: UUri) -> Self {
        let mut builder = Self::new(UMessageType::Response, Box::new(ResponseValidator));
        builder.source = Some(invoked_method);
        builder.sink = Some(reply_to_address);
        builder.reqid = Some(request_id);
        builder.priority = UPriority::Cs4;
        builder
    }

    pub fn with_priority(mut self, priority: UPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_message_id(mut self, id: UUID) -> Self {
        self.id = id;
        self
    }

    fn to_attributes(&self) -> UAttributes {
        UAttributes {
            type_: self.message_type,
            source: self.source.clone().unwrap_or_default(),
            sink: self.sink.clone(),
            priority: self.priority,
            ttl: self.ttl,
            id: self.id,
            reqid: self.reqid,
            payload_format: self.payload_format,
            ..Default::default()
        }
    }

    /// Builds a message without a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes accumulated so far are not valid for
    /// the message type this builder was created for.
    pub fn build(&self) -> Result<UMessage, UMessageError> {
        let attributes = self.to_attributes();
        self.validator.validate(&attributes)?;
        Ok(UMessage::new(attributes, None))
    }

    /// Builds a message with the given payload and format.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes accumulated so far are not valid for
    /// the message type this builder was created for.
    pub fn build_with_payload(
        mut self,
        payload: impl Into<Bytes>,
        format: UPayloadFormat,
    ) -> Result<UMessage, UMessageError> {
        self.payload_format = format;
        let attributes = self.to_attributes();
        self.validator.validate(&attributes)?;
        Ok(UMessage::new(attributes, Some(payload.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> UUri {
        UUri {
            authority_name: "vehicle".to_string(),
            ue_id: 0x1001,
            ue_version_major: 1,
            resource_id: 0x8001,
        }
    }

    fn method() -> UUri {
        UUri {
            authority_name: "vehicle".to_string(),
            ue_id: 0x1002,
            ue_version_major: 1,
            resource_id: 0x0003,
        }
    }

    fn reply_to() -> UUri {
        UUri {
            authority_name: "client".to_string(),
            ue_id: 0x2001,
            ue_version_major: 1,
            resource_id: 0,
        }
    }

    #[test]
    fn builds_publish_message() {
        let msg = UMessageBuilder::publish(topic()).build().unwrap();
        assert!(msg.attributes().is_publish());
        assert_eq!(msg.attributes().source, topic());
    }

    #[test]
    fn builds_request_message_with_payload() {
        let msg = UMessageBuilder::request(method(), reply_to(), 5_000)
            .build_with_payload(Bytes::from_static(b"lock"), UPayloadFormat::Text)
            .unwrap();
        assert!(msg.attributes().is_request());
        assert_eq!(msg.attributes().sink, Some(method()));
        assert_eq!(msg.payload().unwrap().as_ref(), b"lock");
    }

    #[test]
    fn builds_response_message_correlated_to_request() {
        let request = UMessageBuilder::request(method(), reply_to(), 5_000)
            .build()
            .unwrap();
        let response = UMessageBuilder::response(
            request.attributes().source.clone(),
            request.attributes().id,
            method(),
        )
        .build()
        .unwrap();
        assert_eq!(response.attributes().reqid, Some(request.attributes().id));
    }

    #[test]
    fn request_without_ttl_fails_validation() {
        let mut builder = UMessageBuilder::request(method(), reply_to(), 5_000);
        builder.ttl = None;
        assert!(builder.build().is_err());
    }
}
