use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

use crate::core::Schema;

/// Request body decoded as JSON and validated against `T`'s schema.
///
/// Decode failures go through the app's `JsonConfig`; schema failures are
/// returned as `ValidationError` and rendered as a 400.
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for Validated<T>
where
    T: Schema + 'static,
{
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<serde_json::Value>::from_request(req, payload);
        let path = req.path().to_owned();

        Box::pin(async move {
            let raw = body.await?.into_inner();
            match T::parse(&raw) {
                Ok(record) => Ok(Validated(record)),
                Err(err) => {
                    tracing::info!("Validation failed on {}: {}", path, err);
                    Err(err.into())
                }
            }
        })
    }
}
