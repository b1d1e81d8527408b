//! Link shortening service implementation.
//!
//! This crate provides [`ShortenerService`], which owns the link table,
//! generates codes and persists every change through a
//! [`LinkStore`](pinhole_core::LinkStore). Core types are re-exported from
//! `pinhole_core`.

pub mod service;

pub use pinhole_core::{
    LinkRecord, LinkStats, ShortCode, ShortenResponse, Shortener, ShortenerError,
};
pub use service::{ShortenerService, ShortenerSettings, DEFAULT_MAX_ATTEMPTS};
