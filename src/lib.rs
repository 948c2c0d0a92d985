//! Purpose: Client SDK for a headless CMS with typed, polymorphic element decoding.
//! Exports: `core` (element model, factory, content, decoders), `api` (client surface).
//! Role: Library crate backing the `cmskit` CLI and downstream applications.
//! Invariants: The decoding core performs no I/O and holds no shared mutable state.
//! Invariants: Transport, token storage, and plugins are injected, never global.
pub mod api;
pub mod core;
