use thiserror::Error;

use crate::api::{ResultItem, ResultPayload};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("output URL missing from response")]
    MissingOutputUrl,
}

/// Normalize the heterogeneous result payload into a single output URL.
///
/// The payload is either a direct object or a sequence (first element wins).
/// Within the chosen item, fields are probed in fixed priority order:
/// `mediaUrl`, then `image`, then `video`. The order follows the API as
/// observed; whether it encodes schema versioning is unverified.
pub fn resolve(payload: Option<&ResultPayload>) -> Result<&str, ResolveError> {
    let item: &ResultItem = match payload {
        Some(ResultPayload::One(item)) => item,
        Some(ResultPayload::Many(items)) => {
            items.first().ok_or(ResolveError::MissingOutputUrl)?
        }
        None => return Err(ResolveError::MissingOutputUrl),
    };

    item.media_url
        .as_deref()
        .or(item.image.as_deref())
        .or(item.video.as_deref())
        .ok_or(ResolveError::MissingOutputUrl)
}
