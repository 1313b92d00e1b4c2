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

mod uattributesvalidator;
mod upayloadformat;
mod upriority;

pub use uattributesvalidator::{
    NotificationValidator, PublishValidator, RequestValidator, ResponseValidator,
    UAttributesValidator, UAttributesValidators,
};
pub use upayloadformat::{UPayloadError, UPayloadFormat};
pub use upriority::UPriority;

use serde::{Deserialize, Serialize};

use crate::{UCode, UUri, UUID};

/// The kind of interaction a [`UAttributes`] record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UMessageType {
    #[default]
    Unspecified,
    Publish,
    Request,
    Response,
    Notification,
}

#[derive(Debug)]
pub enum UAttributesError {
    ValidationError(String),
    ParsingError(String),
}

impl UAttributesError {
    pub fn validation_error<T: Into<String>>(message: T) -> UAttributesError {
        Self::ValidationError(message.into())
    }

    pub fn parsing_error<T: Into<String>>(message: T) -> UAttributesError {
        Self::ParsingError(message.into())
    }
}

impl std::fmt::Display for UAttributesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError(e) => f.write_fmt(format_args!("validation error: {}", e)),
            Self::ParsingError(e) => f.write_fmt(format_args!("parsing error: {}", e)),
        }
    }
}

impl std::error::Error for UAttributesError {}

/// The metadata that accompanies every [`UMessage`](crate::UMessage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UAttributes {
    #[serde(rename = "type")]
    pub type_: UMessageType,
    pub source: UUri,
    pub sink: Option<UUri>,
    pub priority: UPriority,
    pub ttl: Option<u32>,
    pub id: UUID,
    pub reqid: Option<UUID>,
    pub payload_format: UPayloadFormat,
    pub permission_level: Option<u32>,
    pub token: Option<String>,
    pub commstatus: Option<UCode>,
    pub traceparent: Option<String>,
}

impl Default for UAttributes {
    fn default() -> Self {
        UAttributes {
            type_: UMessageType::Unspecified,
            source: UUri::default(),
            sink: None,
            priority: UPriority::Unspecified,
            ttl: None,
            id: UUID::default(),
            reqid: None,
            payload_format: UPayloadFormat::Unspecified,
            permission_level: None,
            token: None,
            commstatus: None,
            traceparent: None,
        }
    }
}

impl UAttributes {
    pub fn is_publish(&self) -> bool {
        self.type_ == UMessageType::Publish
    }

    pub fn is_request(&self) -> bool {
        self.type_ == UMessageType::Request
    }

    pub fn is_response(&self) -> bool {
        self.type_ == UMessageType::Response
    }

    pub fn is_notification(&self) -> bool {
        self.type_ == UMessageType::Notification
    }
}
