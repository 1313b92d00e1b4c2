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

use mediatype::MediaType;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum UPayloadError {
    SerializationError(String),
    MediatypeProblem,
}

impl UPayloadError {
    pub fn serialization_error<T>(message: T) -> UPayloadError
    where
        T: Into<String>,
    {
        Self::SerializationError(message.into())
    }

    pub fn mediatype_error() -> UPayloadError {
        Self::MediatypeProblem
    }
}

impl PartialEq for UPayloadError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::MediatypeProblem, Self::MediatypeProblem)
        ) || matches!((self, other), (Self::SerializationError(a), Self::SerializationError(b)) if a == b)
    }
}

impl std::fmt::Display for UPayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializationError(e) => f.write_fmt(format_args!("serialization error: {e}")),
            Self::MediatypeProblem => {
                f.write_str("mediatype problem: unsupported or malformed")
            }
        }
    }
}

impl std::error::Error for UPayloadError {}

/// The encoding used for a [`UMessage`](crate::UMessage)'s payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UPayloadFormat {
    #[default]
    Unspecified,
    Protobuf,
    ProtobufWrappedInAny,
    Json,
    Someip,
    SomeipTlv,
    Raw,
    Text,
}

impl UPayloadFormat {
    /// Gets the payload format that corresponds to a given media type.
    ///
    /// # Errors
    ///
    /// Returns an error if the given string is not a valid media type string or is
    /// not one of the media types uProtocol assigns a payload format to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use up_transport_zenoh::UPayloadFormat;
    ///
    /// let parse_attempt = UPayloadFormat::from_media_type("application/json; charset=utf-8");
    /// assert!(parse_attempt.is_ok());
    /// assert_eq!(parse_attempt.unwrap(), UPayloadFormat::Json);
    ///
    /// assert!(UPayloadFormat::from_media_type("application/unsupported").is_err());
    /// ```
    pub fn from_media_type(media_type_string: &str) -> Result<Self, UPayloadError> {
        let media_type =
            MediaType::parse(media_type_string).map_err(|_| UPayloadError::mediatype_error())?;
        match (media_type.ty.as_str(), media_type.subty.as_str()) {
            ("application", "json") => Ok(Self::Json),
            ("application", "protobuf") => Ok(Self::Protobuf),
            ("application", "x-protobuf") => Ok(Self::ProtobufWrappedInAny),
            ("application", "octet-stream") => Ok(Self::Raw),
            ("application", "x-someip") => Ok(Self::Someip),
            ("application", "x-someip_tlv") => Ok(Self::SomeipTlv),
            ("text", "plain") => Ok(Self::Text),
            _ => Err(UPayloadError::mediatype_error()),
        }
    }

    /// Gets the media type corresponding to this payload format, or `None` for
    /// [`UPayloadFormat::Unspecified`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use up_transport_zenoh::UPayloadFormat;
    ///
    /// assert_eq!(UPayloadFormat::Json.to_media_type().unwrap(), "application/json");
    /// assert!(UPayloadFormat::Unspecified.to_media_type().is_none());
    /// ```
    pub fn to_media_type(self) -> Option<String> {
        match self {
            Self::Unspecified => None,
            Self::Protobuf => Some("application/protobuf".to_string()),
            Self::ProtobufWrappedInAny => Some("application/x-protobuf".to_string()),
            Self::Json => Some("application/json".to_string()),
            Self::Someip => Some("application/x-someip".to_string()),
            Self::SomeipTlv => Some("application/x-someip_tlv".to_string()),
            Self::Raw => Some("application/octet-stream".to_string()),
            Self::Text => Some("text/plain".to_string()),
        }
    }
}
