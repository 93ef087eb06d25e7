use axum::{
    async_trait,
    body::Body,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use tracing::debug;
use validator::Validate;

use crate::shared::AppError;

/// JSON body extractor that deserializes into `T` and then runs its field rules.
///
/// Unknown fields are ignored by serde. Every rejection (missing body, wrong
/// content type, bad JSON, wrong field type, failed rule) becomes a 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection.body_text(), "Rejected request body");
                AppError::Validation(rejection.body_text())
            })?;

        validated(value).map(Self)
    }
}

/// Body limit for the buffered PATCH bodies, matching axum's default
const PATCH_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Like [`ValidatedJson`], for bodies where every field is optional.
///
/// A missing or blank body is read as `T::default()`, i.e. `{}`. Anything
/// else goes through the same JSON and rule checks.
#[derive(Debug)]
pub struct ValidatedPatch<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedPatch<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, PATCH_BODY_LIMIT)
            .await
            .map_err(|e| {
                debug!(error = %e, "Failed to read request body");
                AppError::Validation("Failed to read request body".to_string())
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("Empty patch body, treating as {{}}");
            return validated(T::default()).map(Self);
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let ValidatedJson(value) = ValidatedJson::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

fn validated<T: Validate>(value: T) -> Result<T, AppError> {
    value.validate().map_err(|errors| {
        debug!(error = %errors, "Request body failed validation");
        AppError::Validation(errors.to_string())
    })?;
    Ok(value)
}

/// Deserializes a present field into `Some(value)`, so that together with
/// `#[serde(default)]` an absent field is `None` and `null` is `Some(None)`.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Path extractor whose parse failures surface as JSON 400s
#[derive(Debug)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        Ok(Self(value))
    }
}
