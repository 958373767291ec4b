//! ShipFlow Docker Image functionality
//!
//! This crate provides the image half of the ShipFlow lifecycle:
//! build context creation, image building, re-tagging, authenticated
//! pushing to container registries, and existence-check / pull.
//!
//! All daemon access goes through the [`ImageApi`] trait so that the
//! components can be exercised against a mock daemon in tests.

pub mod api;
pub mod auth;
pub mod builder;
pub mod context;
pub mod error;
pub mod puller;
pub mod pusher;
pub mod reference;
pub mod tagger;

pub use api::ImageApi;
pub use auth::registry_credentials;
pub use builder::{BUILD_TIMEOUT_SECS, ImageBuilder};
pub use context::{BuildContext, ContextArchiver};
pub use error::{ImageError, ImageResult};
pub use puller::ImagePuller;
pub use pusher::{DEFAULT_PUSH_RETRY_COUNT, ImagePusher};
pub use reference::ImageReference;
pub use tagger::{ImageTagger, TAG_TIMEOUT_SECS};
