//! Release metadata enrichment - resolves albums to MusicBrainz releases and
//! caches what we learn about them.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Identifiers** (`mbid.rs`) - Validated, normalized MBIDs
//! - **Domain models** (`domain.rs`) - Snapshots, track descriptors, errors
//! - **API DTOs** (`musicbrainz/dto.rs`, `coverart/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Provider** (`provider.rs`) - The clients behind one [`MetadataProvider`] seam
//! - **Service** (`service.rs`) - Cache-aside orchestration over a [`crate::cache::SnapshotStore`]
//!
//! # Usage
//!
//! ```ignore
//! use enrichment::{MetadataService, MusicBrainzProvider, ServiceConfig};
//!
//! let provider = MusicBrainzProvider::from_config(MusicBrainzConfig::default(), coverart::DEFAULT_BASE_URL)?;
//! let service = MetadataService::new(store, Arc::new(provider), ServiceConfig::default());
//!
//! let mbid = service.resolve_mbid("The Beatles", "Abbey Road").await?;
//! ```

pub mod coverart;
pub mod domain;
mod inflight;
pub mod mbid;
pub mod musicbrainz;
pub mod provider;
pub mod service;
pub mod traits;

pub use domain::{MetadataError, MetadataSnapshot, SearchResponse, TrackInfo};
pub use mbid::Mbid;
pub use provider::MusicBrainzProvider;
pub use service::{MetadataService, ServiceConfig};
pub use traits::MetadataProvider;
