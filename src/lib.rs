//! Eduledger - Educational Content Platform Backend
//!
//! This crate implements the payment lifecycle for course and lesson
//! purchases: hosted checkout at an external gateway, webhook-driven
//! reconciliation with an on-demand poll fallback, and durable deferred
//! work for notification fanout and grant repair.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
