//! Protocol encoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `writer`: safe byte emission and protocol conventions
//! - `builder`: domain-level encoding (no direct byte indexing)
//!
//! Builders are pure and contain no I/O; sockets and timing live in the
//! sender layer.

pub mod artnet;
