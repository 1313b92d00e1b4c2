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

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub(crate) const ANY_AUTHORITY: &str = "*";
pub(crate) const ANY_ENTITY_ID: u32 = 0xFFFF_FFFF;
pub(crate) const ANY_ENTITY_VERSION: u32 = 0xFF;
pub(crate) const ANY_RESOURCE_ID: u32 = 0xFFFF;

pub(crate) const RESPONSE_RESOURCE_ID: u32 = 0x0000;
pub(crate) const TOPIC_RESOURCE_FLOOR: u32 = 0x8000;

const MAX_AUTHORITY_LEN: usize = 128;

#[derive(Debug)]
pub enum UUriError {
    SerializationError(String),
    ValidationError(String),
}

impl UUriError {
    pub fn serialization_error<T>(message: T) -> UUriError
    where
        T: Into<String>,
    {
        Self::SerializationError(message.into())
    }

    pub fn validation_error<T>(message: T) -> UUriError
    where
        T: Into<String>,
    {
        Self::ValidationError(message.into())
    }
}

impl std::fmt::Display for UUriError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializationError(e) => write!(f, "serialization error: {e}"),
            Self::ValidationError(e) => write!(f, "validation error: {e}"),
        }
    }
}

impl std::error::Error for UUriError {}

/// A structured uProtocol URI.
///
/// `authority_name` names the device/domain a uEntity runs on (empty means
/// "local"), `ue_id`/`ue_version_major` identify the entity and its major
/// version, and `resource_id` selects a topic, RPC method, or the RPC
/// response slot (`0`) within that entity. Any field may instead carry its
/// wildcard sentinel, in which case this `UUri` describes a pattern rather
/// than a single addressable resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UUri {
    pub authority_name: String,
    pub ue_id: u32,
    pub ue_version_major: u32,
    pub resource_id: u32,
}

impl From<&UUri> for String {
    fn from(uri: &UUri) -> Self {
        uri.to_uri(false)
    }
}

/// Splits off a leading `up:` scheme (case-insensitively), rejecting any
/// other scheme outright.
fn strip_scheme(input: &str) -> Result<&str, UUriError> {
    match input.split_once(':') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("up") => Ok(rest),
        Some((scheme, _)) => Err(UUriError::serialization_error(format!(
            "uProtocol URI must use the 'up' scheme, found '{scheme}'"
        ))),
        None => Ok(input),
    }
}

/// Validates a bare authority string (no scheme, no path): rejects userinfo,
/// a port, and anything over [`MAX_AUTHORITY_LEN`] characters.
fn validate_authority(authority: &str) -> Result<String, String> {
    if authority.contains('@') {
        return Err("authority must not carry userinfo".to_string());
    }
    if authority.contains(':') {
        return Err("authority must not carry a port".to_string());
    }
    if authority.chars().count() > MAX_AUTHORITY_LEN {
        return Err(format!(
            "authority must not exceed {MAX_AUTHORITY_LEN} characters"
        ));
    }
    Ok(authority.to_string())
}

/// Splits `//authority/path...` into its authority and remaining path, or
/// treats the whole input as a path when it has no `//` prefix (a local URI).
fn split_authority(rest: &str) -> Result<(String, &str), UUriError> {
    match rest.strip_prefix("//") {
        Some(tail) => {
            let split_at = tail.find('/').unwrap_or(tail.len());
            let (authority, path) = tail.split_at(split_at);
            let authority_name =
                validate_authority(authority).map_err(UUriError::serialization_error)?;
            Ok((authority_name, path))
        }
        None => Ok((String::new(), rest)),
    }
}

/// Parses the three `/`-separated hex segments that make up a URI's path:
/// entity ID, entity version, resource ID.
fn parse_path(path: &str) -> Result<(u32, u32, u32), UUriError> {
    let mut segments = path.trim_start_matches('/').split('/');
    let entity = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UUriError::serialization_error("URI is missing its entity ID segment"))?;
    let version = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UUriError::serialization_error("URI is missing its entity version segment"))?;
    let resource = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UUriError::serialization_error("URI is missing its resource ID segment"))?;
    if segments.next().is_some() {
        return Err(UUriError::serialization_error(
            "URI path must contain exactly three segments",
        ));
    }

    let ue_id = u32::from_str_radix(entity, 16)
        .map_err(|e| UUriError::serialization_error(format!("entity ID is not valid hex: {e}")))?;
    let ue_version_major = u8::from_str_radix(version, 16)
        .map_err(|e| UUriError::serialization_error(format!("entity version is not valid hex: {e}")))?;
    let resource_id = u16::from_str_radix(resource, 16)
        .map_err(|e| UUriError::serialization_error(format!("resource ID is not valid hex: {e}")))?;
    Ok((ue_id, u32::from(ue_version_major), u32::from(resource_id)))
}

impl FromStr for UUri {
    type Err = UUriError;

    /// Parses a `up://authority/ue_id/ver/rid` (scheme and authority both
    /// optional) string into a [`UUri`].
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(UUriError::serialization_error("URI must not be empty"));
        }
        let rest = strip_scheme(input)?;
        if let Some(special) = rest.find(['?', '#']) {
            return Err(UUriError::serialization_error(format!(
                "URI must not contain a '{}'",
                &rest[special..=special]
            )));
        }
        let (authority_name, path) = split_authority(rest)?;
        let (ue_id, ue_version_major, resource_id) = parse_path(path)?;
        Ok(UUri {
            authority_name,
            ue_id,
            ue_version_major,
            resource_id,
        })
    }
}

impl TryFrom<String> for UUri {
    type Error = UUriError;

    fn try_from(uri: String) -> Result<Self, Self::Error> {
        uri.parse()
    }
}

impl TryFrom<&str> for UUri {
    type Error = UUriError;

    fn try_from(uri: &str) -> Result<Self, Self::Error> {
        uri.parse()
    }
}

impl UUri {
    /// Renders this `UUri` as a string, optionally prefixed with the `up:`
    /// scheme.
    pub fn to_uri(&self, include_scheme: bool) -> String {
        let mut out = String::new();
        if include_scheme {
            out.push_str("up:");
        }
        if !self.authority_name.is_empty() {
            out.push_str("//");
            out.push_str(&self.authority_name);
        }
        let _ = write!(
            out,
            "/{:X}/{:X}/{:X}",
            self.ue_id, self.ue_version_major, self.resource_id
        );
        out
    }

    /// Builds a `UUri` from its individual parts, validating the authority.
    pub fn try_from_parts(
        authority: &str,
        entity_id: u32,
        entity_version: u8,
        resource_id: u16,
    ) -> Result<Self, UUriError> {
        let authority_name = validate_authority(authority).map_err(UUriError::validation_error)?;
        Ok(UUri {
            authority_name,
            ue_id: entity_id,
            ue_version_major: u32::from(entity_version),
            resource_id: u32::from(resource_id),
        })
    }

    /// A `UUri` whose every field is its wildcard sentinel; matches anything.
    pub fn any() -> Self {
        Self::any_with_resource(ANY_RESOURCE_ID)
    }

    /// A wildcard `UUri` pinned to a specific resource ID.
    pub fn any_with_resource(resource_id: u32) -> Self {
        UUri {
            authority_name: ANY_AUTHORITY.to_string(),
            ue_id: ANY_ENTITY_ID,
            ue_version_major: ANY_ENTITY_VERSION,
            resource_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == UUri::default()
    }

    /// A URI with an empty authority addresses the local node.
    pub fn is_local(&self) -> bool {
        self.authority_name.is_empty()
    }

    pub fn has_wildcard_authority(&self) -> bool {
        self.authority_name == ANY_AUTHORITY
    }

    pub fn has_wildcard_entity(&self) -> bool {
        self.ue_id == ANY_ENTITY_ID
    }

    pub fn has_wildcard_version(&self) -> bool {
        self.ue_version_major == ANY_ENTITY_VERSION
    }

    pub fn has_wildcard_resource(&self) -> bool {
        self.resource_id == ANY_RESOURCE_ID
    }

    fn has_any_wildcard(&self) -> bool {
        self.has_wildcard_authority()
            || self.has_wildcard_entity()
            || self.has_wildcard_version()
            || self.has_wildcard_resource()
    }

    /// Fails unless every field of this `UUri` is a concrete value, i.e. it
    /// addresses exactly one resource rather than a pattern.
    pub fn require_fully_resolved(&self) -> Result<(), UUriError> {
        if self.has_wildcard_authority() {
            Err(UUriError::validation_error(
                "authority must be a concrete name, not the wildcard '*'",
            ))
        } else if self.has_wildcard_entity() {
            Err(UUriError::validation_error(format!(
                "entity ID must be concrete, not the wildcard value {ANY_ENTITY_ID:#X}"
            )))
        } else if self.has_wildcard_version() {
            Err(UUriError::validation_error(format!(
                "entity version must be concrete, not the wildcard value {ANY_ENTITY_VERSION:#X}"
            )))
        } else if self.has_wildcard_resource() {
            Err(UUriError::validation_error(format!(
                "resource ID must be concrete, not the wildcard value {ANY_RESOURCE_ID:#X}"
            )))
        } else {
            Ok(())
        }
    }

    /// `0 < resource_id < 0x8000`: an RPC method.
    pub fn is_rpc_method(&self) -> bool {
        self.resource_id > RESPONSE_RESOURCE_ID && self.resource_id < TOPIC_RESOURCE_FLOOR
    }

    pub fn require_rpc_method(&self) -> Result<(), UUriError> {
        if !self.is_rpc_method() {
            return Err(UUriError::validation_error(format!(
                "resource ID must fall within ({RESPONSE_RESOURCE_ID:#X}, {TOPIC_RESOURCE_FLOOR:#X})"
            )));
        }
        self.require_fully_resolved()
    }

    /// `resource_id == 0`: either an RPC response slot or a notification
    /// destination — the two share the same address shape.
    pub fn is_response_slot(&self) -> bool {
        self.resource_id == RESPONSE_RESOURCE_ID
    }

    pub fn require_response_slot(&self) -> Result<(), UUriError> {
        if !self.is_response_slot() {
            return Err(UUriError::validation_error(format!(
                "resource ID must be {RESPONSE_RESOURCE_ID:#X}"
            )));
        }
        self.require_fully_resolved()
    }

    /// `0x8000 <= resource_id < 0xFFFF`: a publish/notification topic.
    pub fn is_topic(&self) -> bool {
        self.resource_id >= TOPIC_RESOURCE_FLOOR && !self.has_wildcard_resource()
    }

    pub fn require_topic(&self) -> Result<(), UUriError> {
        if !self.is_topic() {
            return Err(UUriError::validation_error(format!(
                "resource ID must be >= {TOPIC_RESOURCE_FLOOR:#X}"
            )));
        }
        self.require_fully_resolved()
    }

    /// Tests whether `candidate`, a concrete URI, satisfies this `UUri`
    /// viewed as a pattern: every field either matches exactly or this side
    /// carries that field's wildcard sentinel.
    pub fn matches(&self, candidate: &UUri) -> bool {
        if !self.has_any_wildcard() {
            return self == candidate;
        }
        (self.has_wildcard_authority() || self.authority_name == candidate.authority_name)
            && (self.has_wildcard_entity() || self.ue_id == candidate.ue_id)
            && (self.has_wildcard_version() || self.ue_version_major == candidate.ue_version_major)
            && (self.has_wildcard_resource() || self.resource_id == candidate.resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(""; "empty input")]
    #[test_case("gopher://host/1/1/1"; "unsupported scheme")]
    #[test_case("up://host/1/1/1?x=1"; "query component present")]
    #[test_case("up://host/1/1/1#frag"; "fragment present")]
    #[test_case("up://user@host/1/1/1"; "userinfo in authority")]
    #[test_case("up://host:42/1/1/1"; "port in authority")]
    #[test_case("up:///1/1"; "too few path segments")]
    #[test_case("up:///1/1/1/1"; "too many path segments")]
    #[test_case("up:///zz/1/1"; "non-hex entity ID")]
    fn parsing_rejects(input: &str) {
        assert!(UUri::from_str(input).is_err());
    }

    #[test_case("up:/A/1/1", UUri { authority_name: String::new(), ue_id: 0xA, ue_version_major: 1, resource_id: 1 }; "local uri, scheme present")]
    #[test_case("/200/1/8001", UUri { authority_name: String::new(), ue_id: 0x200, ue_version_major: 1, resource_id: 0x8001 }; "local uri, no scheme")]
    #[test_case("up://relay.local/30A/2/3", UUri { authority_name: "relay.local".to_string(), ue_id: 0x30A, ue_version_major: 2, resource_id: 3 }; "remote uri")]
    #[test_case("UP://*/FFFFFFFF/FF/FFFF", UUri { authority_name: "*".to_string(), ue_id: ANY_ENTITY_ID, ue_version_major: 0xFF, resource_id: 0xFFFF }; "scheme is case insensitive, all wildcards")]
    fn parsing_accepts(input: &str, expected: UUri) {
        assert_eq!(UUri::from_str(input).unwrap(), expected);
    }

    #[test]
    fn authority_over_length_limit_is_rejected() {
        let long_authority = "x".repeat(MAX_AUTHORITY_LEN + 1);
        let uri = format!("up://{long_authority}/1/1/1");
        assert!(UUri::from_str(&uri).is_err());
    }

    #[test]
    fn to_uri_round_trips_through_from_str() {
        let original = UUri {
            authority_name: "edge-3".to_string(),
            ue_id: 0x4455,
            ue_version_major: 9,
            resource_id: 0x8123,
        };
        let rendered = original.to_uri(true);
        assert_eq!(UUri::from_str(&rendered).unwrap(), original);
    }

    #[test_case(RESPONSE_RESOURCE_ID, false, true, false; "response slot")]
    #[test_case(0x0042, true, false, false; "rpc method")]
    #[test_case(0x9000, false, false, true; "topic")]
    #[test_case(ANY_RESOURCE_ID, false, false, false; "wildcard resource is none of the three")]
    fn resource_kind_predicates(resource_id: u32, rpc: bool, response: bool, topic: bool) {
        let uri = UUri {
            resource_id,
            ..UUri::default()
        };
        assert_eq!(uri.is_rpc_method(), rpc);
        assert_eq!(uri.is_response_slot(), response);
        assert_eq!(uri.is_topic(), topic);
    }

    #[test]
    fn require_fully_resolved_rejects_each_wildcard_field() {
        assert!(UUri::any().require_fully_resolved().is_err());
        let mut resolved = UUri {
            authority_name: "node".to_string(),
            ue_id: 1,
            ue_version_major: 1,
            resource_id: 0x8000,
        };
        assert!(resolved.require_fully_resolved().is_ok());
        resolved.resource_id = ANY_RESOURCE_ID;
        assert!(resolved.require_fully_resolved().is_err());
    }

    #[test_case("//*/1/1/1", "//node/1/1/1"; "wildcard authority")]
    #[test_case("//node/FFFFFFFF/1/1", "//node/77/1/1"; "wildcard entity")]
    #[test_case("//node/1/FF/1", "//node/1/3/1"; "wildcard version")]
    #[test_case("//node/1/1/FFFF", "//node/1/1/8005"; "wildcard resource")]
    #[test_case("//node/1/1/1", "//node/1/1/1"; "no wildcards, identical uris")]
    fn matches_succeeds(pattern: &str, candidate: &str) {
        let pattern = UUri::try_from(pattern).unwrap();
        let candidate = UUri::try_from(candidate).unwrap();
        assert!(pattern.matches(&candidate));
    }

    #[test_case("//node/1/1/1", "//other/1/1/1"; "different authority")]
    #[test_case("//node/1/1/1", "//node/2/1/1"; "different entity")]
    #[test_case("//node/1/1/1", "//node/1/2/1"; "different version")]
    #[test_case("//node/1/1/1", "//node/1/1/2"; "different resource")]
    fn matches_fails(pattern: &str, candidate: &str) {
        let pattern = UUri::try_from(pattern).unwrap();
        let candidate = UUri::try_from(candidate).unwrap();
        assert!(!pattern.matches(&candidate));
    }
}
