//! Request identity.
//!
//! Authentication is a stub: every request resolves to the demo user.
//! Everything below the API layer treats the owner id as an opaque value,
//! so swapping this extractor for a real one is a local change.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// The user a request acts on behalf of.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl CurrentUser {
    pub fn demo() -> Self {
        Self {
            id: 1,
            username: "demo_user".to_string(),
            email: "demo@example.com".to_string(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::demo())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_user() {
        let user = CurrentUser::demo();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "demo_user");
    }
}
