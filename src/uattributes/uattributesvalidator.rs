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

use std::fmt::Display;

use crate::uattributes::{UAttributes, UAttributesError, UMessageType, UPriority};

/// Checks a [`UAttributes`] record's priority against the minimum priority
/// required for RPC request/response traffic.
fn validate_rpc_priority(attributes: &UAttributes) -> Result<(), UAttributesError> {
    if attributes.priority < UPriority::Cs4 {
        return Err(UAttributesError::validation_error(format!(
            "RPC messages require a priority of at least {:?} but got {:?}",
            UPriority::Cs4,
            attributes.priority
        )));
    }
    Ok(())
}

/// Validates [`UAttributes`] for conformance with the rules of the
/// message type it declares.
pub trait UAttributesValidator: Display {
    /// Validates the given attributes.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first rule that is violated.
    fn validate(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        self.validate_type(attributes)?;
        self.validate_source(attributes)?;
        self.validate_sink(attributes)?;
        self.validate_id(attributes)
    }

    /// Checks that the `id` is present (always true for a well-formed record;
    /// overridden by validators that additionally require a `reqid`).
    fn validate_id(&self, _attributes: &UAttributes) -> Result<(), UAttributesError> {
        Ok(())
    }

    /// Checks that `attributes.type_` matches [`Self::message_type`].
    fn validate_type(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        if attributes.type_ == self.message_type() {
            Ok(())
        } else {
            Err(UAttributesError::validation_error(format!(
                "expected message type {:?} but got {:?}",
                self.message_type(),
                attributes.type_
            )))
        }
    }

    /// The message type this validator validates.
    fn message_type(&self) -> UMessageType;

    /// Checks that `attributes.source` is well-formed for this message type.
    fn validate_source(&self, attributes: &UAttributes) -> Result<(), UAttributesError>;

    /// Checks that `attributes.sink` is well-formed (or absent) for this message type.
    fn validate_sink(&self, attributes: &UAttributes) -> Result<(), UAttributesError>;
}

/// Dispatches to the [`UAttributesValidator`] matching a given message type.
pub enum UAttributesValidators {
    Publish,
    Notification,
    Request,
    Response,
}

impl UAttributesValidators {
    pub fn validator(&self) -> Box<dyn UAttributesValidator> {
        match self {
            Self::Publish => Box::new(PublishValidator),
            Self::Notification => Box::new(NotificationValidator),
            Self::Request => Box::new(RequestValidator),
            Self::Response => Box::new(ResponseValidator),
        }
    }

    /// Picks the validator matching `attributes.type_`.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes carry an unsupported or unspecified message type.
    pub fn get_validator_for_attributes(
        attributes: &UAttributes,
    ) -> Result<Box<dyn UAttributesValidator>, UAttributesError> {
        Self::get_validator(attributes.type_)
    }

    pub fn get_validator(
        message_type: UMessageType,
    ) -> Result<Box<dyn UAttributesValidator>, UAttributesError> {
        match message_type {
            UMessageType::Publish => Ok(Self::Publish.validator()),
            UMessageType::Notification => Ok(Self::Notification.validator()),
            UMessageType::Request => Ok(Self::Request.validator()),
            UMessageType::Response => Ok(Self::Response.validator()),
            UMessageType::Unspecified => Err(UAttributesError::validation_error(
                "cannot validate attributes with unspecified message type",
            )),
        }
    }
}

/// Validates the attributes of a Publish message: an event source with no sink.
pub struct PublishValidator;

impl Display for PublishValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PublishValidator")
    }
}

impl UAttributesValidator for PublishValidator {
    fn message_type(&self) -> UMessageType {
        UMessageType::Publish
    }

    fn validate_source(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        attributes
            .source
            .require_topic()
            .map_err(|e| UAttributesError::validation_error(format!("invalid publish source: {e}")))
    }

    fn validate_sink(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        if attributes.sink.is_some() {
            Err(UAttributesError::validation_error(
                "publish messages must not have a sink",
            ))
        } else {
            Ok(())
        }
    }
}

/// Validates the attributes of a Notification: an event source and a resolved destination.
pub struct NotificationValidator;

impl Display for NotificationValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NotificationValidator")
    }
}

impl UAttributesValidator for NotificationValidator {
    fn message_type(&self) -> UMessageType {
        UMessageType::Notification
    }

    fn validate_source(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        if attributes.source.is_response_slot() {
            return Err(UAttributesError::validation_error(
                "notification source must not be an RPC response address",
            ));
        }
        attributes.source.require_fully_resolved().map_err(|e| {
            UAttributesError::validation_error(format!("invalid notification source: {e}"))
        })
    }

    fn validate_sink(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        match &attributes.sink {
            Some(sink) => sink.require_response_slot().map_err(|e| {
                UAttributesError::validation_error(format!("invalid notification sink: {e}"))
            }),
            None => Err(UAttributesError::validation_error(
                "notification messages require a sink",
            )),
        }
    }
}

/// Validates the attributes of an RPC Request: a reply-to source and a method sink.
pub struct RequestValidator;

impl Display for RequestValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RequestValidator")
    }
}

impl RequestValidator {
    fn validate_ttl(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        match attributes.ttl {
            Some(ttl) if ttl > 0 => Ok(()),
            _ => Err(UAttributesError::validation_error(
                "RPC request messages require a ttl greater than 0",
            )),
        }
    }
}

impl UAttributesValidator for RequestValidator {
    fn message_type(&self) -> UMessageType {
        UMessageType::Request
    }

    fn validate(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        self.validate_type(attributes)?;
        self.validate_source(attributes)?;
        self.validate_sink(attributes)?;
        self.validate_ttl(attributes)?;
        validate_rpc_priority(attributes)
    }

    fn validate_source(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        attributes.source.require_response_slot().map_err(|e| {
            UAttributesError::validation_error(format!("invalid request reply-to address: {e}"))
        })
    }

    fn validate_sink(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        match &attributes.sink {
            Some(sink) => sink.require_rpc_method().map_err(|e| {
                UAttributesError::validation_error(format!(
                    "invalid request method-to-invoke address: {e}"
                ))
            }),
            None => Err(UAttributesError::validation_error(
                "RPC request messages require a sink",
            )),
        }
    }
}

/// Validates the attributes of an RPC Response: a method source and a reply-to sink.
pub struct ResponseValidator;

impl Display for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseValidator")
    }
}

impl ResponseValidator {
    fn validate_reqid(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        match &attributes.reqid {
            Some(reqid) if reqid.is_uprotocol_uuid() => Ok(()),
            Some(_) => Err(UAttributesError::validation_error(
                "response reqid is not a valid uProtocol UUID",
            )),
            None => Err(UAttributesError::validation_error(
                "RPC response messages require a reqid",
            )),
        }
    }
}

impl UAttributesValidator for ResponseValidator {
    fn message_type(&self) -> UMessageType {
        UMessageType::Response
    }

    fn validate(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        self.validate_type(attributes)?;
        self.validate_source(attributes)?;
        self.validate_sink(attributes)?;
        self.validate_reqid(attributes)?;
        validate_rpc_priority(attributes)
    }

    fn validate_source(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        attributes.source.require_rpc_method().map_err(|e| {
            UAttributesError::validation_error(format!(
                "invalid response invoked-method address: {e}"
            ))
        })
    }

    fn validate_sink(&self, attributes: &UAttributes) -> Result<(), UAttributesError> {
        match &attributes.sink {
            Some(sink) => sink.require_response_slot().map_err(|e| {
                UAttributesError::validation_error(format!("invalid response reply-to address: {e}"))
            }),
            None => Err(UAttributesError::validation_error(
                "RPC response messages require a sink",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UUri, UUID};

    fn publish_topic() -> UUri {
        UUri {
            authority_name: "vcu.someVin".to_string(),
            ue_id: 0x0001_0001,
            ue_version_major: 1,
            resource_id: 0x8001,
        }
    }

    fn origin() -> UUri {
        UUri {
            authority_name: "vcu.someVin".to_string(),
            ue_id: 0x0001_0002,
            ue_version_major: 1,
            resource_id: 0,
        }
    }

    fn method_to_invoke() -> UUri {
        UUri {
            authority_name: "vcu.someVin".to_string(),
            ue_id: 0x0001_0003,
            ue_version_major: 1,
            resource_id: 0x0003,
        }
    }

    fn publish_attributes() -> UAttributes {
        UAttributes {
            type_: UMessageType::Publish,
            source: publish_topic(),
            id: UUID::build(),
            ..Default::default()
        }
    }

    fn notification_attributes() -> UAttributes {
        UAttributes {
            type_: UMessageType::Notification,
            source: publish_topic(),
            sink: Some(origin()),
            id: UUID::build(),
            ..Default::default()
        }
    }

    fn request_attributes() -> UAttributes {
        UAttributes {
            type_: UMessageType::Request,
            source: origin(),
            sink: Some(method_to_invoke()),
            ttl: Some(5_000),
            priority: UPriority::Cs4,
            id: UUID::build(),
            ..Default::default()
        }
    }

    fn response_attributes() -> UAttributes {
        let request_id = UUID::build();
        UAttributes {
            type_: UMessageType::Response,
            source: method_to_invoke(),
            sink: Some(origin()),
            priority: UPriority::Cs4,
            id: UUID::build(),
            reqid: Some(request_id),
            ..Default::default()
        }
    }

    #[test]
    fn publish_validator_accepts_its_own_attributes() {
        assert!(PublishValidator.validate(&publish_attributes()).is_ok());
    }

    #[test]
    fn notification_validator_accepts_its_own_attributes() {
        assert!(NotificationValidator
            .validate(&notification_attributes())
            .is_ok());
    }

    #[test]
    fn request_validator_accepts_its_own_attributes() {
        assert!(RequestValidator.validate(&request_attributes()).is_ok());
    }

    #[test]
    fn response_validator_accepts_its_own_attributes() {
        assert!(ResponseValidator.validate(&response_attributes()).is_ok());
    }

    #[test]
    fn publish_validator_rejects_request_attributes() {
        assert!(PublishValidator.validate(&request_attributes()).is_err());
    }

    #[test]
    fn request_validator_rejects_missing_ttl() {
        let mut attrs = request_attributes();
        attrs.ttl = None;
        assert!(RequestValidator.validate(&attrs).is_err());
    }

    #[test]
    fn request_validator_rejects_low_priority() {
        let mut attrs = request_attributes();
        attrs.priority = UPriority::Cs1;
        assert!(RequestValidator.validate(&attrs).is_err());
    }

    #[test]
    fn response_validator_rejects_missing_reqid() {
        let mut attrs = response_attributes();
        attrs.reqid = None;
        assert!(ResponseValidator.validate(&attrs).is_err());
    }

    #[test]
    fn notification_validator_rejects_missing_sink() {
        let mut attrs = notification_attributes();
        attrs.sink = None;
        assert!(NotificationValidator.validate(&attrs).is_err());
    }

    #[test]
    fn publish_validator_rejects_sink() {
        let mut attrs = publish_attributes();
        attrs.sink = Some(origin());
        assert!(PublishValidator.validate(&attrs).is_err());
    }

    #[test]
    fn get_validator_for_attributes_dispatches_correctly() {
        assert!(
            UAttributesValidators::get_validator_for_attributes(&publish_attributes())
                .unwrap()
                .validate(&publish_attributes())
                .is_ok()
        );
        assert!(UAttributesValidators::get_validator_for_attributes(&UAttributes::default())
            .is_err());
    }
}
