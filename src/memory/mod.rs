//! The orchestrating client and its async façade.
//!
//! [`Client`] is the only component that reads or mutates the vector store;
//! it owns the embed → dedup → insert pipeline and the reader/writer lock
//! that makes dedup-check-then-merge atomic with respect to other mutations.

pub mod async_client;
pub mod client;
pub mod options;
pub mod types;

pub use async_client::AsyncClient;
pub use client::Client;
