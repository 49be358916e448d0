//! Authenticated session wrapper.
//!
//! Logging in — cookies, fkeys, whatever the site wants this year — is the
//! caller's problem, handled outside this crate. A [`KaSession`] wraps any
//! already-authenticated [`HttpClient`] (typically a `reqwest::Client` with a
//! cookie store populated by an external login flow) and adds the one thing
//! the content model needs from a session: who the logged-in user is.
//!
//! Sessions are not content. They have no id and no equality; they just
//! carry credentials.

use std::future::Future;

use crate::content::str_field;
use crate::endpoint::{Endpoint, fetch_json};
use crate::error::ApiResult;
use crate::http_client::HttpClient;
use crate::urls::ka_url;
use crate::user::User;

/// An externally authenticated session against the site.
#[derive(Debug, Clone)]
pub struct KaSession<C> {
    inner: C,
}

impl<C> KaSession<C> {
    /// Wraps an authenticated HTTP client.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps back into the inner client.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> KaSession<C>
where
    C: HttpClient + Sync,
{
    /// The kaid of the logged-in user.
    ///
    /// `api/v1/user` describes the authorized user when asked without
    /// parameters.
    pub async fn user_id(&self) -> ApiResult<String> {
        let info = fetch_json(
            &self.inner,
            Endpoint::get(ka_url("api/v1/user")),
            None,
            None,
        )
        .await?;
        Ok(str_field(&info, "kaid")?.to_owned())
    }

    /// The logged-in [`User`].
    pub async fn user(&self) -> ApiResult<User> {
        Ok(User::new(self.user_id().await?))
    }
}

impl<C> HttpClient for KaSession<C>
where
    C: HttpClient + Sync,
{
    type Error = C::Error;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>> + Send
    {
        self.inner.send_http(request)
    }
}
