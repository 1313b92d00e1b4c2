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

//! A uProtocol transport implementation that exchanges messages over a
//! Zenoh-style pub/sub and query overlay.

mod uattributes;
mod umessage;
mod uri;
mod ustatus;
mod utransport;
mod uuid;

pub mod transport;

pub use uattributes::{
    NotificationValidator, PublishValidator, RequestValidator, ResponseValidator, UAttributes,
    UAttributesError, UAttributesValidator, UAttributesValidators, UMessageType, UPayloadFormat,
    UPriority,
};
pub use umessage::{UMessage, UMessageBuilder, UMessageError};
pub use uri::{UUri, UUriError};
pub use ustatus::{UCode, UStatus};
pub use utransport::{ComparableListener, LocalUriProvider, UListener, UTransport};
#[cfg(any(test, feature = "test-util"))]
pub use utransport::{MockLocalUriProvider, MockUListener, MockUTransport};
pub use uuid::{UuidConversionError, UUID};

pub use transport::{UPTransportZenoh, ZenohTransportConfig, ZenohTransportError};
