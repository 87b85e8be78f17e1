#![warn(missing_docs)]
//! Models and ports for a sealed-bid tender marketplace.
//!
//! Buyers publish tenders, suppliers submit offers whose financial payload is
//! sealed with authenticated encryption, and once the opening date is reached
//! the offers are unsealed, summarized into an opening report and ranked.
//! This crate holds the domain types and the interfaces that the persistence,
//! sealing and notification adapters implement; the workflows themselves live
//! in `tender-engine`.

/// Core domain models for the tender lifecycle.
///
/// The models in this module are primarily data structures with a small
/// amount of pure logic (the status state machine, score rounding and ranking,
/// report aggregation). Nothing here performs I/O, which keeps the rules that
/// matter most easy to test in isolation from their adapters.
pub mod models;

/// Interface traits for the tender lifecycle.
///
/// This module contains the "ports" in the hexagonal architecture pattern.
///
/// These traits define the contract between the workflows and the external
/// adapters (relational store, key management, audit sink, notification
/// channel) without specifying implementation details.
pub mod ports;
