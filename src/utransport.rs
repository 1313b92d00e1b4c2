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

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{UMessage, UStatus, UUri};

/// Receives messages dispatched by a [`UTransport`].
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait UListener: Send + Sync {
    /// Called for every message that matches the filters this listener was
    /// [registered](UTransport::register_listener) with.
    async fn on_receive(&self, message: UMessage);
}

/// A wrapper around `Arc<dyn UListener>` that compares listeners by pointer
/// identity rather than by value, so that the same listener handed to
/// `register_listener` and `unregister_listener` is recognized as one
/// registration even though `dyn UListener` itself has no natural equality.
#[derive(Clone)]
pub struct ComparableListener {
    inner: Arc<dyn UListener>,
}

impl ComparableListener {
    pub fn new(listener: Arc<dyn UListener>) -> Self {
        ComparableListener { inner: listener }
    }
}

impl Deref for ComparableListener {
    type Target = dyn UListener;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl std::fmt::Debug for ComparableListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparableListener")
            .field("inner", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl PartialEq for ComparableListener {
    /// `true` if the pointer held by `self` is equal to the pointer held by `other`.
    /// Consistent with [`ComparableListener::hash`].
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ComparableListener {}

impl std::hash::Hash for ComparableListener {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as *const ()).hash(state);
    }
}

/// Resolves resource IDs local to a uEntity into fully qualified [`UUri`]s.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait LocalUriProvider: Send + Sync {
    /// The authority this uEntity's transport is reachable at.
    fn get_authority(&self) -> String;

    /// The `UUri` identifying the given local resource.
    fn get_resource_uri(&self, resource_id: u16) -> UUri;

    /// The `UUri` identifying this uEntity itself (resource ID `0`).
    fn get_source_uri(&self) -> UUri;
}

/// The contract a uProtocol transport implementation exposes to application code:
/// sending messages and (un-)registering listeners for incoming ones.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait UTransport: Send + Sync {
    /// Sends a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    async fn send(&self, message: UMessage) -> Result<(), UStatus>;

    /// Registers a listener for messages matching the given source (and,
    /// optionally, sink) filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be registered.
    async fn register_listener<'a, 'b>(
        &self,
        source_filter: &'a UUri,
        sink_filter: Option<&'b UUri>,
        listener: Arc<dyn UListener>,
    ) -> Result<(), UStatus>;

    /// Unregisters a previously [registered](Self::register_listener) listener.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching listener is registered.
    async fn unregister_listener<'a, 'b>(
        &self,
        source_filter: &'a UUri,
        sink_filter: Option<&'b UUri>,
        listener: Arc<dyn UListener>,
    ) -> Result<(), UStatus>;
}
