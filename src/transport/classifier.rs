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

//! Classifies a (source, sink) filter pair into the kinds of message
//! exchange it can observe, purely from the resource-ID ranges involved.
//!
//! | src rid     | sink rid   | Publish | Notification | Request | Response |
//! |-------------|------------|---------|--------------|---------|----------|
//! | `[8000,FFFE)` | none     |    x    |              |         |          |
//! | `[8000,FFFE)` | `0`      |         |      x       |         |          |
//! | `0`         | `(0,8000)` |         |              |    x    |          |
//! | `(0,8000)`  | `0`        |         |              |         |    x     |
//! | `FFFF`      | `0`        |         |      x       |         |    x     |
//! | `FFFF`      | `(0,8000)` |         |              |    x    |          |
//! | `0`         | `FFFF`     |         |              |    x    |          |
//! | `(0,8000)`  | `FFFF`     |         |              |         |    x     |
//! | `[8000,FFFE)` | `FFFF`   |         |      x       |         |          |
//! | `FFFF`      | `FFFF`     |         |      x       |    x    |    x     |

/// The upper (exclusive) bound of the RPC method resource-ID range `(0, 0x8000)`.
const RPC_METHOD_RANGE_END: u32 = 0x8000;
/// The upper (inclusive) bound of the topic/event resource-ID range `[0x8000, 0xFFFE]`.
const TOPIC_RANGE_END: u32 = 0xFFFE;
/// The resource ID reserved for an RPC response sink.
const RPC_RESPONSE_RESOURCE_ID: u32 = 0;
/// The wildcard resource ID, matching any of the above.
const WILDCARD_RESOURCE_ID: u32 = 0xFFFF;

fn is_method_id(id: u32) -> bool {
    id > RPC_RESPONSE_RESOURCE_ID && id < RPC_METHOD_RANGE_END
}

fn is_topic_id(id: u32) -> bool {
    id >= RPC_METHOD_RANGE_END && id <= TOPIC_RANGE_END
}

bitflags::bitflags! {
    /// The kinds of message exchange a given (source, sink) filter pair can
    /// observe. Under wildcard resource IDs more than one bit may be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MessageKind: u8 {
        const PUBLISH      = 0b0001;
        const NOTIFICATION = 0b0010;
        const REQUEST      = 0b0100;
        const RESPONSE     = 0b1000;
    }
}

/// Classifies a filter pair's source resource ID (and, when present, the
/// sink's) into the set of message kinds it can observe.
///
/// `sink_filter_resource_id` of `None` represents a subscription with no
/// sink constraint at all, which can only ever observe plain `PUBLISH`
/// traffic.
pub fn classify(source_resource_id: u32, sink_filter_resource_id: Option<u32>) -> MessageKind {
    let src = source_resource_id;
    let Some(dst) = sink_filter_resource_id else {
        return if is_topic_id(src) || src == WILDCARD_RESOURCE_ID {
            MessageKind::PUBLISH
        } else {
            MessageKind::empty()
        };
    };

    let mut kind = MessageKind::empty();

    if (is_topic_id(src) && (dst == RPC_RESPONSE_RESOURCE_ID || dst == WILDCARD_RESOURCE_ID))
        || (src == WILDCARD_RESOURCE_ID && (dst == RPC_RESPONSE_RESOURCE_ID || dst == WILDCARD_RESOURCE_ID))
    {
        kind |= MessageKind::NOTIFICATION;
    }

    if (src == RPC_RESPONSE_RESOURCE_ID && (is_method_id(dst) || dst == WILDCARD_RESOURCE_ID))
        || (src == WILDCARD_RESOURCE_ID && (is_method_id(dst) || dst == WILDCARD_RESOURCE_ID))
    {
        kind |= MessageKind::REQUEST;
    }

    if (is_method_id(src) && (dst == RPC_RESPONSE_RESOURCE_ID || dst == WILDCARD_RESOURCE_ID))
        || (src == WILDCARD_RESOURCE_ID && (dst == RPC_RESPONSE_RESOURCE_ID || dst == WILDCARD_RESOURCE_ID))
    {
        kind |= MessageKind::RESPONSE;
    }

    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x8001, None, MessageKind::PUBLISH; "topic resource id without sink is a publish subscription")]
    #[test_case(0x0003, None, MessageKind::empty(); "method resource id without sink observes nothing")]
    #[test_case(0xFFFF, None, MessageKind::PUBLISH; "wildcard resource id without sink observes publish")]
    fn classifies_source_only_filters(source: u32, sink: Option<u32>, expected: MessageKind) {
        assert_eq!(classify(source, sink), expected);
    }

    #[test_case(0x0003, Some(0x8001), MessageKind::empty(); "method source with topic sink observes nothing")]
    #[test_case(0x8001, Some(0), MessageKind::NOTIFICATION; "topic source with response sink is a notification")]
    #[test_case(0x8001, Some(0xFFFF), MessageKind::NOTIFICATION; "topic source with wildcard sink is a notification")]
    #[test_case(0, Some(0x0003), MessageKind::REQUEST; "response source with method sink is a request")]
    #[test_case(0, Some(0xFFFF), MessageKind::REQUEST; "response source with wildcard sink is a request")]
    #[test_case(0x0003, Some(0), MessageKind::RESPONSE; "method source with response sink is a response")]
    #[test_case(0x0003, Some(0xFFFF), MessageKind::RESPONSE; "method source with wildcard sink is a response")]
    #[test_case(0xFFFF, Some(0), MessageKind::NOTIFICATION | MessageKind::RESPONSE; "wildcard source with response sink is notification and response")]
    #[test_case(0xFFFF, Some(0xFFFF), MessageKind::NOTIFICATION | MessageKind::REQUEST | MessageKind::RESPONSE; "wildcard source and sink observe notification, request, and response")]
    fn classifies_source_and_sink_filters(source: u32, sink: Option<u32>, expected: MessageKind) {
        assert_eq!(classify(source, sink), expected);
    }
}
