//! Marker store: which host markers belong to which message.
//!
//! A single message may be represented by several markers (its highlight marker, plus the anchor
//! of any tooltip listing it). Both maps are keyed by [`DiagnosticMessage::key`] and always hold
//! the same key set.

use crate::host::{EditorHost, MarkerId};
use crate::message::DiagnosticMessage;
use std::collections::BTreeMap;
use tracing::debug;

/// Message-keyed marker buckets plus the message map.
#[derive(Debug, Default)]
pub struct MarkerStore {
    buckets: BTreeMap<String, Vec<MarkerId>>,
    messages: BTreeMap<String, DiagnosticMessage>,
}

impl MarkerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` and append `marker` to its bucket.
    pub fn insert(&mut self, message: DiagnosticMessage, marker: MarkerId) {
        self.buckets
            .entry(message.key.clone())
            .or_default()
            .push(marker);
        self.messages.insert(message.key.clone(), message);
    }

    /// Append `marker` to the bucket of an already stored message.
    pub fn save(&mut self, key: &str, marker: MarkerId) {
        debug_assert!(
            self.messages.contains_key(key),
            "marker saved for unknown message {key:?}"
        );
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.push(marker);
        }
    }

    /// Destroy every marker stored for `key` and forget the message.
    ///
    /// Host failures are swallowed: destruction can race with the document being closed.
    /// Returns the markers that were dropped.
    pub fn destroy<H: EditorHost + ?Sized>(&mut self, host: &mut H, key: &str) -> Vec<MarkerId> {
        self.messages.remove(key);
        let markers = self.buckets.remove(key).unwrap_or_default();
        for marker in &markers {
            if let Err(err) = host.destroy_marker(*marker) {
                debug!(key, ?marker, error = %err, "ignoring marker destroy failure");
            }
        }
        markers
    }

    /// Destroy everything.
    pub fn destroy_all<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> Vec<MarkerId> {
        let keys: Vec<String> = self.buckets.keys().cloned().collect();
        let mut destroyed = Vec::new();
        for key in keys {
            destroyed.extend(self.destroy(host, &key));
        }
        destroyed
    }

    /// Drop `marker` from every bucket without destroying it.
    pub fn forget_marker(&mut self, marker: MarkerId) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|m| *m != marker);
        }
    }

    /// The message stored under `key`.
    pub fn message(&self, key: &str) -> Option<&DiagnosticMessage> {
        self.messages.get(key)
    }

    pub(crate) fn message_mut(&mut self, key: &str) -> Option<&mut DiagnosticMessage> {
        self.messages.get_mut(key)
    }

    /// All stored messages, ordered by key.
    pub fn messages(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.values()
    }

    /// Markers stored for `key`.
    pub fn markers(&self, key: &str) -> &[MarkerId] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every `(message, marker)` pair, in key order.
    pub fn iter_markers(&self) -> impl Iterator<Item = (&DiagnosticMessage, MarkerId)> {
        self.buckets.iter().flat_map(move |(key, markers)| {
            let message = self.messages.get(key);
            markers
                .iter()
                .filter_map(move |marker| message.map(|message| (message, *marker)))
        })
    }

    /// Key owning `marker`, if any.
    pub fn key_for_marker(&self, marker: MarkerId) -> Option<&str> {
        self.buckets
            .iter()
            .find(|(_, markers)| markers.contains(&marker))
            .map(|(key, _)| key.as_str())
    }

    /// Stored keys, ordered.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Total number of stored markers.
    pub fn marker_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Assert that buckets and messages agree on their keys.
    pub fn check_invariants(&self) {
        debug_assert!(
            self.buckets.keys().eq(self.messages.keys()),
            "marker buckets and message map diverged"
        );
    }
}
