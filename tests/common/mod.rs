//! Common test utilities for provenance and pipeline scenarios
//!
//! This module provides text items, an in-memory document and mock
//! operations that optionally trace what they produce.

#![allow(dead_code)]

pub mod items;
pub mod ops;

pub use items::{text_of, texts, MockDocument, TextItem};
pub use ops::{
    AttributeAdder, Failing, Generator, KeywordMatcher, Merger, Prefixer, Splitter, Uppercaser,
};

/// Route `tracing` output through the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
