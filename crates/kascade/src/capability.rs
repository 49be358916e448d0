//! Capability traits composable onto content types.
//!
//! Each capability is an independent contract a content type opts into by
//! implementing the trait; a type carries any subset of them. Shared
//! operation logic lives in free functions parameterized over the trait, so
//! the traits themselves stay thin: an endpoint or two plus provided methods
//! delegating to the shared implementation.

use std::future::Future;

use futures::stream::{BoxStream, StreamExt};
use serde_json::{Value, json};

use crate::content::{Content, str_field};
use crate::dictpath;
use crate::endpoint::{Endpoint, fetch_json, send_expect_ok};
use crate::error::{ApiResult, ClientError, FieldError};
use crate::feed::ReplyFeed;
use crate::http_client::HttpClient;

/// Topic slug attached to replies unless the caller picks another.
pub const DEFAULT_TOPIC: &str = "computer-programming";

/// Content whose metadata fields can be edited.
pub trait Editable: Content {
    /// Endpoint (and method) edits are submitted to.
    ///
    /// Editing is PUT for most content; the method rides along in the
    /// descriptor so types that need POST just say so.
    fn api_edit(&self) -> Endpoint;

    /// Applies `changes` and submits the whole updated document.
    ///
    /// Every change is routed through the type's path map: the current
    /// metadata is fetched, each named field is written at its declared path,
    /// and the entire mutated document goes back to [`Editable::api_edit`].
    /// Unknown field names fail with [`FieldError::Unknown`]; non-2xx
    /// responses propagate.
    fn edit<C>(
        &self,
        session: &C,
        changes: &[(&str, Value)],
    ) -> impl Future<Output = ApiResult<()>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        edit_content(self, session, changes)
    }
}

/// Content that can be replied to.
pub trait Replyable: Content {
    /// The content type replies to this item come back as.
    type Reply: Content + Send;

    /// URL serving this item's reply feed; replies POST to the same URL.
    fn reply_url(&self) -> String;

    /// Builds a reply handle from its identifying key, parented to self.
    fn reply_from_key(&self, key: String) -> Self::Reply;

    /// This item's reply feed, as raw feed entries.
    ///
    /// Every call builds a fresh, finite stream that re-walks the feed from
    /// the start; there is no consistency guarantee across calls. Each
    /// concrete type supplies its own feed-walking logic (single fetch,
    /// pagination, thread scan).
    fn reply_data<'a, C>(&'a self, client: &'a C) -> ReplyFeed<'a>
    where
        C: HttpClient + Sync;

    /// Posts a reply with the default topic.
    fn reply<C>(
        &self,
        session: &C,
        message: &str,
    ) -> impl Future<Output = ApiResult<Self::Reply>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        self.reply_with_topic(session, message, DEFAULT_TOPIC)
    }

    /// Posts a reply under an explicit topic slug.
    fn reply_with_topic<C>(
        &self,
        session: &C,
        message: &str,
        topic: &str,
    ) -> impl Future<Output = ApiResult<Self::Reply>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        post_reply(self, session, message, topic)
    }

    /// Reply handles built from [`Replyable::reply_data`] entries.
    fn replies<'a, C>(&'a self, client: &'a C) -> BoxStream<'a, ApiResult<Self::Reply>>
    where
        C: HttpClient + Sync,
        Self: Sync + Sized,
    {
        Box::pin(self.reply_data(client).map(move |entry| {
            let entry = entry?;
            let key = str_field(&entry, "key")?;
            Ok(self.reply_from_key(key.to_owned()))
        }))
    }
}

/// Content that can have questions asked about it.
///
/// Declared for completeness; no concrete type implements the operations
/// yet, so the provided methods fail loudly instead of pretending to work.
pub trait Questionable: Content {
    /// Asks a question about this content.
    fn ask_question<C>(
        &self,
        _session: &C,
        _question: &str,
    ) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
    {
        async {
            Err(ClientError::Unimplemented {
                capability: "ask_question",
            })
        }
    }

    /// The questions asked about this content.
    fn questions<C>(&self, _client: &C) -> impl Future<Output = ApiResult<Vec<Value>>> + Send
    where
        C: HttpClient + Sync,
    {
        async {
            Err(ClientError::Unimplemented {
                capability: "questions",
            })
        }
    }
}

/// Content that can be spun off from.
///
/// Same status as [`Questionable`]: a declared placeholder whose operations
/// always fail until something overrides them.
pub trait Spinoffable: Content {
    /// Creates a spin-off of this content.
    fn spinoff<C>(&self, _session: &C) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
    {
        async {
            Err(ClientError::Unimplemented {
                capability: "spinoff",
            })
        }
    }

    /// The spin-offs created from this content.
    fn spinoffs<C>(&self, _client: &C) -> impl Future<Output = ApiResult<Vec<Value>>> + Send
    where
        C: HttpClient + Sync,
    {
        async {
            Err(ClientError::Unimplemented {
                capability: "spinoffs",
            })
        }
    }
}

/// Content that can be deleted.
pub trait Deletable: Content {
    /// Endpoint deletion is issued against.
    fn api_delete(&self) -> Endpoint;

    /// Deletes this content on the server.
    ///
    /// A remote side effect only: the local handle stays usable and simply
    /// starts erroring once the server forgets the id.
    fn delete<C>(&self, session: &C) -> impl Future<Output = ApiResult<()>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        delete_content(self, session)
    }
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(item, session, changes), fields(id = item.id()))
)]
async fn edit_content<T, C>(item: &T, session: &C, changes: &[(&str, Value)]) -> ApiResult<()>
where
    T: Editable + ?Sized + Sync,
    C: HttpClient + Sync,
{
    let mut metadata = item.metadata(session).await?;
    for (name, value) in changes {
        let path = item
            .path_map()
            .resolve(name)
            .ok_or_else(|| FieldError::Unknown {
                field: (*name).to_owned(),
            })?;
        dictpath::set(&mut metadata, path, value.clone())?;
    }
    send_expect_ok(session, item.api_edit(), None, Some(&metadata)).await
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(item, session, message), fields(id = item.id()))
)]
async fn post_reply<T, C>(
    item: &T,
    session: &C,
    message: &str,
    topic: &str,
) -> ApiResult<T::Reply>
where
    T: Replyable + ?Sized + Sync,
    C: HttpClient + Sync,
{
    let body = json!({ "text": message, "topic_slug": topic });
    let response = fetch_json(
        session,
        Endpoint::post(item.reply_url()),
        None,
        Some(&body),
    )
    .await?;
    let key = str_field(&response, "key")?;
    Ok(item.reply_from_key(key.to_owned()))
}

async fn delete_content<T, C>(item: &T, session: &C) -> ApiResult<()>
where
    T: Deletable + ?Sized + Sync,
    C: HttpClient + Sync,
{
    send_expect_ok(session, item.api_delete(), None, None).await
}
