//! # smarthome-domain
//!
//! Pure domain model for the smarthome thing/channel framework.
//!
//! ## Responsibilities
//! - Foundational types: hierarchical UIDs, error conventions
//! - Define **Types** (thing types, bridge types, channel types, channel group types)
//! - Define **Things** (concrete device instances, their channels and status)
//! - Define **Configuration** and **Config descriptions** (schemas + validation)
//! - Define **Commands/States** sent to and reported by channels
//! - Define **Events** (thing lifecycle and channel records)
//! - Define **i18n keys** used to localize type labels
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod i18n;
pub mod uid;

pub mod command;
pub mod config;
pub mod event;
pub mod thing;
pub mod types;
