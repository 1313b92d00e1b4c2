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

//! Translates uProtocol [`UUri`]s into the flat, hierarchical key expressions
//! used by the overlay.

use crate::uri::{ANY_ENTITY_ID, ANY_ENTITY_VERSION, ANY_RESOURCE_ID};
use crate::UUri;

const WILDCARD: &str = "*";

fn hex_or_wildcard(value: u32, wildcard: u32) -> String {
    if value == wildcard {
        WILDCARD.to_string()
    } else {
        format!("{:X}", value)
    }
}

/// Renders `<authority>/<ue_id_hex>/<ver_hex>/<rid_hex>` for a single URI,
/// substituting `local_authority` when the URI's own authority is empty.
pub fn uri_to_segment(local_authority: &str, uri: &UUri) -> String {
    let authority = if uri.authority_name.is_empty() {
        local_authority
    } else {
        uri.authority_name.as_str()
    };
    format!(
        "{}/{}/{}/{}",
        authority,
        hex_or_wildcard(uri.ue_id, ANY_ENTITY_ID),
        hex_or_wildcard(uri.ue_version_major, ANY_ENTITY_VERSION),
        hex_or_wildcard(uri.resource_id, ANY_RESOURCE_ID),
    )
}

/// Builds the overlay key expression for a (source, sink) pair.
///
/// When `sink` is absent, the second segment is rendered as the literal
/// placeholder `{}/{}/{}/{}`, matching any sink in overlay subscriptions.
pub fn to_overlay_key(local_authority: &str, src: &UUri, sink: Option<&UUri>) -> String {
    let src_segment = uri_to_segment(local_authority, src);
    match sink {
        Some(sink) => format!("up/{}/{}", src_segment, uri_to_segment(local_authority, sink)),
        None => format!("up/{}/{{}}/{{}}/{{}}/{{}}", src_segment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_key_with_placeholder_sink() {
        let src = UUri {
            authority_name: String::new(),
            ue_id: 0x10AB,
            ue_version_major: 3,
            resource_id: 0x80CD,
        };
        assert_eq!(
            to_overlay_key("192.168.1.100", &src, None),
            "up/192.168.1.100/10AB/3/80CD/{}/{}/{}/{}"
        );
    }

    #[test]
    fn builds_key_with_explicit_sink() {
        let src = UUri {
            authority_name: "192.168.1.100".to_string(),
            ue_id: 0x10AB,
            ue_version_major: 3,
            resource_id: 0x80CD,
        };
        let sink = UUri {
            authority_name: "192.168.1.101".to_string(),
            ue_id: 0x20EF,
            ue_version_major: 4,
            resource_id: 0,
        };
        assert_eq!(
            to_overlay_key("192.168.1.100", &src, Some(&sink)),
            "up/192.168.1.100/10AB/3/80CD/192.168.1.101/20EF/4/0"
        );
    }

    #[test]
    fn renders_wildcards_as_asterisks() {
        let src = UUri {
            authority_name: "*".to_string(),
            ue_id: ANY_ENTITY_ID,
            ue_version_major: 0xFF,
            resource_id: 0xFFFF,
        };
        let sink = UUri {
            authority_name: "192.168.1.101".to_string(),
            ue_id: 0x20EF,
            ue_version_major: 4,
            resource_id: 0,
        };
        assert_eq!(
            to_overlay_key("irrelevant", &src, Some(&sink)),
            "up/*/*/*/*/192.168.1.101/20EF/4/0"
        );
    }

    #[test]
    fn key_is_deterministic_for_identical_inputs() {
        let src = UUri {
            authority_name: "auth".to_string(),
            ue_id: 0x1,
            ue_version_major: 1,
            resource_id: 0x8001,
        };
        let a = to_overlay_key("local", &src, None);
        let b = to_overlay_key("local", &src, None);
        assert_eq!(a, b);
    }

    #[test]
    fn local_authority_is_substituted_for_empty_authority() {
        let src = UUri {
            authority_name: String::new(),
            ue_id: 0x1,
            ue_version_major: 1,
            resource_id: 0x8001,
        };
        assert!(to_overlay_key("my-host", &src, None).starts_with("up/my-host/"));
    }
}
