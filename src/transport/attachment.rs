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

//! Encodes and decodes [`UAttributes`] into the overlay's attachment format:
//! an ordered pair of byte blobs, `[version]` followed by `[serialized attributes]`.

use crate::UAttributes;

/// The only attachment version this crate produces or accepts.
pub const ATTACHMENT_VERSION: u8 = 1;

#[derive(Debug)]
pub enum AttachmentError {
    UnsupportedVersion(u8),
    MissingVersionBlob,
    MissingAttributesBlob,
    Serde(serde_json::Error),
}

impl std::fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVersion(v) => {
                f.write_fmt(format_args!("unsupported attachment version: {}", v))
            }
            Self::MissingVersionBlob => f.write_str("attachment is missing its version blob"),
            Self::MissingAttributesBlob => {
                f.write_str("attachment is missing its attributes blob")
            }
            Self::Serde(e) => f.write_fmt(format_args!("failed to (de)serialize attributes: {}", e)),
        }
    }
}

impl std::error::Error for AttachmentError {}

impl From<serde_json::Error> for AttachmentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Encodes `attributes` into the two blobs that make up an overlay attachment,
/// in order: `[version byte], [serialized attributes]`.
pub fn encode_attachment(attributes: &UAttributes) -> Result<[Vec<u8>; 2], AttachmentError> {
    let serialized = serde_json::to_vec(attributes)?;
    Ok([vec![ATTACHMENT_VERSION], serialized])
}

/// Decodes the two blobs of an overlay attachment back into [`UAttributes`].
pub fn decode_attachment(blobs: &[Vec<u8>]) -> Result<UAttributes, AttachmentError> {
    let version_blob = blobs.first().ok_or(AttachmentError::MissingVersionBlob)?;
    let version = *version_blob.first().ok_or(AttachmentError::MissingVersionBlob)?;
    if version != ATTACHMENT_VERSION {
        return Err(AttachmentError::UnsupportedVersion(version));
    }
    let attributes_blob = blobs.get(1).ok_or(AttachmentError::MissingAttributesBlob)?;
    let attributes = serde_json::from_slice(attributes_blob)?;
    Ok(attributes)
}

/// Flattens the two attachment blobs into the single contiguous buffer the
/// overlay's own attachment bytes are carried as on the wire: the version
/// byte followed directly by the serialized attributes.
pub fn encode_wire(attributes: &UAttributes) -> Result<Vec<u8>, AttachmentError> {
    let [version, attrs] = encode_attachment(attributes)?;
    let mut wire = version;
    wire.extend_from_slice(&attrs);
    Ok(wire)
}

/// Reconstructs the two attachment blobs from the flattened wire buffer
/// produced by [`encode_wire`].
pub fn decode_wire(wire: &[u8]) -> Result<UAttributes, AttachmentError> {
    let version = *wire.first().ok_or(AttachmentError::MissingVersionBlob)?;
    let rest = wire.get(1..).ok_or(AttachmentError::MissingAttributesBlob)?;
    decode_attachment(&[vec![version], rest.to_vec()])
}
