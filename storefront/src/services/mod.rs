// storefront/src/services/mod.rs

//! Collaborators outside the database: the auth provider, the object store,
//! and demo seeding.

pub mod auth_service;
pub mod seed;
pub mod upload_service;

pub use auth_service::{AdminUser, SessionVerifier, StaticSessions, SupabaseAuth};
pub use upload_service::{PresignedUpload, R2Signer, UploadSigner};
