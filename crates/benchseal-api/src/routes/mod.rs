//! # API Route Modules
//!
//! - `commitments`: register commitments for unpublished content, look up
//!   a registration by content address.
//! - `submissions`: verify and persist a batch of commit-only and revealed
//!   entries in one unit of work.
//! - `address`: compute the digest and content address of a payload.

pub mod address;
pub mod commitments;
pub mod submissions;
