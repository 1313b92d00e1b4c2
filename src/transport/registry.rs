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

//! Tracks the listeners and in-flight RPC state a running transport needs to
//! dispatch incoming overlay samples and query replies back to application
//! code.
//!
//! Each table below is guarded by its own [`std::sync::Mutex`] and locked
//! only for the duration of the map mutation itself; no lock is ever held
//! across an `.await`.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::utransport::ComparableListener;
use crate::{UStatus, UUID};

/// Something a listener table keeps alive for as long as the listener is
/// registered, e.g. the overlay's own `Subscriber`/`Queryable` handle. The
/// registry never inspects it; dropping it is what tears the registration
/// down on the overlay side.
pub type RegistrationHandle = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    entries: Mutex<HashMap<String, Vec<(ComparableListener, RegistrationHandle)>>>,
}

impl ListenerTable {
    fn insert(&self, key_expr: &str, listener: ComparableListener, handle: RegistrationHandle) -> bool {
        let mut entries = self.entries.lock().expect("listener table lock poisoned");
        let listeners = entries.entry(key_expr.to_string()).or_default();
        if listeners.iter().any(|(l, _)| l == &listener) {
            return false;
        }
        listeners.push((listener, handle));
        true
    }

    fn remove(&self, key_expr: &str, listener: &ComparableListener) -> bool {
        let mut entries = self.entries.lock().expect("listener table lock poisoned");
        let Entry::Occupied(mut occupied) = entries.entry(key_expr.to_string()) else {
            return false;
        };
        let listeners = occupied.get_mut();
        let before = listeners.len();
        listeners.retain(|(l, _)| l != listener);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            occupied.remove();
        }
        removed
    }

    /// Returns every listener registered under a key expression that
    /// intersects `incoming_key`.
    fn matching(&self, incoming_key: &str) -> Vec<ComparableListener> {
        let entries = self.entries.lock().expect("listener table lock poisoned");
        entries
            .iter()
            .filter(|(key_expr, _)| key_expr_intersects(key_expr, incoming_key))
            .flat_map(|(_, listeners)| listeners.iter().map(|(l, _)| l.clone()))
            .collect()
    }

    /// Drops every registration, releasing the overlay-side handles kept
    /// alive in the table.
    fn clear(&self) {
        self.entries.lock().expect("listener table lock poisoned").clear();
    }
}

/// A crude placeholder/wildcard-aware intersection test over the `/`-separated
/// segments produced by [`crate::transport::key`], used for registries backed
/// by a local-only `HashMap` index instead of the overlay's own key-expression
/// matcher (which `zenoh::key_expr::KeyExpr::intersects` provides for samples
/// actually delivered by a running session).
fn key_expr_intersects(a: &str, b: &str) -> bool {
    let a_segments: Vec<&str> = a.split('/').collect();
    let b_segments: Vec<&str> = b.split('/').collect();
    if a_segments.len() != b_segments.len() {
        return false;
    }
    a_segments
        .iter()
        .zip(b_segments.iter())
        .all(|(x, y)| *x == "*" || *y == "*" || *x == "{}" || *y == "{}" || x == y)
}

/// A single-slot table for response ("RPC callback") listeners, for which
/// registration is last-writer-wins rather than duplicate-rejecting.
#[derive(Default)]
struct ResponseCallbackTable {
    entries: Mutex<HashMap<String, ComparableListener>>,
}

impl ResponseCallbackTable {
    fn insert(&self, key_expr: &str, listener: ComparableListener) {
        let mut entries = self.entries.lock().expect("response callback table lock poisoned");
        entries.insert(key_expr.to_string(), listener);
    }

    fn remove(&self, key_expr: &str, listener: &ComparableListener) -> bool {
        let mut entries = self.entries.lock().expect("response callback table lock poisoned");
        match entries.get(key_expr) {
            Some(registered) if registered == listener => {
                entries.remove(key_expr);
                true
            }
            _ => false,
        }
    }

    /// Returns the first registered response listener whose key intersects
    /// `incoming_key`, if any.
    fn matching(&self, incoming_key: &str) -> Option<ComparableListener> {
        let entries = self.entries.lock().expect("response callback table lock poisoned");
        entries
            .iter()
            .find(|(key_expr, _)| key_expr_intersects(key_expr, incoming_key))
            .map(|(_, listener)| listener.clone())
    }

    fn clear(&self) {
        self.entries
            .lock()
            .expect("response callback table lock poisoned")
            .clear();
    }
}

/// A handle back to the overlay query a `REQUEST` message arrived as, kept
/// around until the application calls `send` with the matching `RESPONSE`.
///
/// Abstracting over the concrete overlay query type keeps this module free
/// of any dependency on the overlay crate itself.
#[async_trait]
pub trait PendingReply: Send {
    /// Delivers `payload`/`attachment` as the reply to the original query.
    async fn reply(self: Box<Self>, payload: Bytes, attachment: Vec<u8>) -> Result<(), UStatus>;
}

/// The registry of listeners and in-flight RPC state a transport facade
/// consults while dispatching overlay traffic.
#[derive(Default)]
pub struct Registry {
    subscribers: ListenerTable,
    queryables: ListenerTable,
    rpc_callbacks: ResponseCallbackTable,
    pending_queries: Mutex<HashMap<UUID, Box<dyn PendingReply>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_subscriber(&self, key_expr: &str, listener: ComparableListener, handle: RegistrationHandle) -> bool {
        self.subscribers.insert(key_expr, listener, handle)
    }

    pub fn take_subscriber(&self, key_expr: &str, listener: &ComparableListener) -> bool {
        self.subscribers.remove(key_expr, listener)
    }

    pub fn matching_subscribers(&self, incoming_key: &str) -> Vec<ComparableListener> {
        self.subscribers.matching(incoming_key)
    }

    pub fn insert_queryable(&self, key_expr: &str, listener: ComparableListener, handle: RegistrationHandle) -> bool {
        self.queryables.insert(key_expr, listener, handle)
    }

    pub fn take_queryable(&self, key_expr: &str, listener: &ComparableListener) -> bool {
        self.queryables.remove(key_expr, listener)
    }

    pub fn matching_queryables(&self, incoming_key: &str) -> Vec<ComparableListener> {
        self.queryables.matching(incoming_key)
    }

    /// Registers a response listener at `key_expr`. Last-writer-wins: a
    /// second registration under the same key silently replaces the first.
    pub fn insert_response(&self, key_expr: &str, listener: ComparableListener) {
        self.rpc_callbacks.insert(key_expr, listener)
    }

    pub fn take_response(&self, key_expr: &str, listener: &ComparableListener) -> bool {
        self.rpc_callbacks.remove(key_expr, listener)
    }

    /// Finds the response listener registered under a key that intersects
    /// `outgoing_key`, used when dispatching a `REQUEST` send.
    pub fn matching_response(&self, outgoing_key: &str) -> Option<ComparableListener> {
        self.rpc_callbacks.matching(outgoing_key)
    }

    /// Remembers the overlay query a `REQUEST` arrived as, keyed by the
    /// request's own message ID.
    pub fn remember_query(&self, request_id: UUID, query: Box<dyn PendingReply>) {
        let mut pending = self.pending_queries.lock().expect("pending query lock poisoned");
        pending.insert(request_id, query);
    }

    /// Consumes and returns the query remembered for `request_id`, if any.
    pub fn take_query(&self, request_id: &UUID) -> Option<Box<dyn PendingReply>> {
        let mut pending = self.pending_queries.lock().expect("pending query lock poisoned");
        pending.remove(request_id)
    }

    /// Drops every subscriber, queryable, response callback, and pending
    /// query this registry holds. Used when a transport is closed.
    pub fn clear(&self) {
        self.subscribers.clear();
        self.queryables.clear();
        self.rpc_callbacks.clear();
        self.pending_queries
            .lock()
            .expect("pending query lock poisoned")
            .clear();
    }
}
