//! Runtime support shared by relgen-generated stores.
//!
//! Generated source units are self-contained except for this crate, which
//! carries the pieces that must exist at run time rather than generation
//! time. Today that is [`ReadCache`], the eventually consistent
//! read-through cache that cache-enabled stores embed.

pub mod cache;

pub use cache::ReadCache;
