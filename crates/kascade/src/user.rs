//! Users, identified by their kaid.

use serde_json::Value;

use crate::capability::Editable;
use crate::content::{Content, MetaPathMap, str_field};
use crate::endpoint::{Endpoint, Query, fetch_json};
use crate::error::ApiResult;
use crate::http_client::HttpClient;
use crate::urls::ka_url;

/// A user on the site.
///
/// Users are technically deletable server-side, but account deletion is not
/// something to reach by accident, so this type does not implement
/// [`Deletable`](crate::capability::Deletable).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    kaid: String,
}

crate::meta_path_map! {
    /// Fields exposed on a user profile document.
    pub static USER_MAP for User {
        bio => ["bio"],
        name => ["nickname"],
        username => ["username"],
    }
}

impl User {
    /// Builds a user handle from a kaid. No network call happens here.
    pub fn new(kaid: impl Into<String>) -> Self {
        Self { kaid: kaid.into() }
    }

    /// The kaid identifying this user.
    pub fn kaid(&self) -> &str {
        &self.kaid
    }

    /// Looks a user up by username.
    pub async fn from_username<C>(client: &C, username: &str) -> ApiResult<Self>
    where
        C: HttpClient + Sync,
    {
        Self::from_identifier(client, "username", username).await
    }

    /// Looks a user up by email.
    pub async fn from_email<C>(client: &C, email: &str) -> ApiResult<Self>
    where
        C: HttpClient + Sync,
    {
        Self::from_identifier(client, "email", email).await
    }

    /// Looks a user up by an arbitrary identifier kind.
    ///
    /// Fetches the profile with `{kind: value}` as the query and builds the
    /// handle from the returned kaid; lookup failures propagate as HTTP
    /// errors.
    pub async fn from_identifier<C>(client: &C, kind: &str, value: &str) -> ApiResult<Self>
    where
        C: HttpClient + Sync,
    {
        let mut query = Query::new();
        query.insert(kind.to_owned(), Value::String(value.to_owned()));
        let profile = fetch_json(
            client,
            Endpoint::get(ka_url("api/internal/user/profile")),
            Some(&query),
            None,
        )
        .await?;
        Ok(Self::new(str_field(&profile, "kaid")?))
    }
}

impl Content for User {
    /// A user's id is their kaid.
    fn id(&self) -> &str {
        &self.kaid
    }

    fn api_get(&self) -> Endpoint {
        Endpoint::get(ka_url(format!(
            "api/internal/user/profile?kaid={}",
            self.kaid
        )))
    }

    fn path_map(&self) -> &'static MetaPathMap {
        &USER_MAP
    }
}

impl Editable for User {
    /// Profile edits go through POST where most content uses PUT.
    fn api_edit(&self) -> Endpoint {
        Endpoint::post(ka_url("api/internal/user/profile"))
    }
}
