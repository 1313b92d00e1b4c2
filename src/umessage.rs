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

mod umessagebuilder;

use bytes::Bytes;
pub use umessagebuilder::UMessageBuilder;

use crate::{UAttributes, UAttributesError};

#[derive(Debug)]
pub enum UMessageError {
    AttributesValidationError(UAttributesError),
    PayloadError(String),
}

impl std::fmt::Display for UMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AttributesValidationError(e) => {
                f.write_fmt(format_args!("message attributes are invalid: {}", e))
            }
            Self::PayloadError(e) => f.write_fmt(format_args!("message payload error: {}", e)),
        }
    }
}

impl std::error::Error for UMessageError {}

impl From<UAttributesError> for UMessageError {
    fn from(value: UAttributesError) -> Self {
        Self::AttributesValidationError(value)
    }
}

impl From<&str> for UMessageError {
    fn from(value: &str) -> Self {
        Self::PayloadError(value.into())
    }
}

/// A container for a message's attributes and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UMessage {
    attributes: UAttributes,
    payload: Option<Bytes>,
}

impl UMessage {
    pub fn new(attributes: UAttributes, payload: Option<Bytes>) -> Self {
        UMessage { attributes, payload }
    }

    pub fn attributes(&self) -> &UAttributes {
        &self.attributes
    }

    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub fn into_parts(self) -> (UAttributes, Option<Bytes>) {
        (self.attributes, self.payload)
    }
}
