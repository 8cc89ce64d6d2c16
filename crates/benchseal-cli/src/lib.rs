//! # benchseal-cli: Contributor Tooling
//!
//! Offline helpers for preparing submissions to a benchseal service.
//!
//! ## Subcommands
//!
//! - `benchseal address <file>`: digest and content address of a payload.
//! - `benchseal keygen --out <file>`: generate an Ed25519 seed.
//! - `benchseal sign --key <file> --digest <hex>`: sign a digest.
//! - `benchseal verify`: check a detached signature over a digest.
//! - `benchseal commit <file> --kind <kind>`: commitment reference plus a
//!   commit-only entry.
//! - `benchseal reveal <file> --kind <kind>`: revealed entry, optionally
//!   tied to its earlier commitment.
//!
//! Nothing here talks to the network. Every identifier is computed with the
//! same `benchseal-core` code the service uses to check it.

pub mod content;
pub mod signing;
