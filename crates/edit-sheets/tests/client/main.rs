//! Client tests against a scripted transport.
//!
//! Each test queues the service's responses in order, drives the public API
//! and then checks the requests that were issued.

mod common;
mod metadata;
mod open;
mod receive;

pub use common::*;
