//! Core types and traits for the Pinhole link service.
//!
//! This crate provides the domain types shared by the storage backends,
//! the code generators and the shortening service.

pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;
pub mod table;
pub mod url;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{LinkRecord, LinkStore};
pub use shortcode::ShortCode;
pub use shortener::{LinkStats, ShortenResponse, Shortener};
pub use table::LinkTable;
pub use url::normalize_url;
