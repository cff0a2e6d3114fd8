pub mod client;
pub mod error;
pub mod types;

pub use client::{EffectsApi, EffectsClient};
pub use error::ApiError;
pub use types::{JobHandle, RemoteStatus, ResultItem, ResultPayload, StatusResponse};
