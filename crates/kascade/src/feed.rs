//! Lazy reply-feed streams.
//!
//! Feeds are restartable, finite-per-call sequences: each constructor builds
//! a fresh stream that walks the feed from the start, fetching pages only as
//! the consumer pulls on it. The underlying data can change between calls,
//! so two walks of the "same" feed carry no consistency guarantee.

use futures::stream::{self, BoxStream, TryStreamExt};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::content::str_field;
use crate::dictpath::PathError;
use crate::endpoint::{Endpoint, Query, fetch_json};
use crate::error::{ApiResult, ClientError, DecodeError};
use crate::http_client::HttpClient;

/// A lazy stream of raw reply-feed entries.
pub type ReplyFeed<'a> = BoxStream<'a, ApiResult<Value>>;

/// One page of a paginated feedback feed.
#[derive(Debug, Deserialize)]
struct FeedPage {
    feedback: Vec<Value>,
    #[serde(rename = "isComplete")]
    is_complete: bool,
    #[serde(default)]
    cursor: Option<Value>,
}

/// Query defaults every paginated feedback fetch starts from.
pub fn default_params() -> Query {
    let mut params = Query::new();
    params.insert("sort".to_owned(), json!(1));
    params.insert("subject".to_owned(), json!("all"));
    params.insert("lang".to_owned(), json!("en"));
    params.insert("limit".to_owned(), json!(10));
    params
}

/// Feed entries from a single fetch returning a bare JSON array.
pub fn listed<C>(client: &C, endpoint: Endpoint) -> ReplyFeed<'_>
where
    C: HttpClient + Sync,
{
    Box::pin(
        stream::once(async move {
            let body = fetch_json(client, endpoint, None, None).await?;
            let entries: Vec<Value> = serde_json::from_value(body).map_err(DecodeError::Json)?;
            ApiResult::Ok(stream::iter(entries.into_iter().map(ApiResult::Ok)))
        })
        .try_flatten(),
    )
}

/// Feed entries from a cursor-paginated endpoint.
///
/// Fetches with `params`, yields every element of the page's `feedback`
/// list, and keeps re-requesting with the response's `cursor` merged into
/// the params until the response reports `isComplete`.
pub fn paginated<C>(client: &C, endpoint: Endpoint, params: Query) -> ReplyFeed<'_>
where
    C: HttpClient + Sync,
{
    let pages = stream::try_unfold(Some(params), move |state| {
        let endpoint = endpoint.clone();
        async move {
            let Some(params) = state else {
                return ApiResult::Ok(None);
            };
            let page = fetch_json(client, endpoint, Some(&params), None).await?;
            let page: FeedPage = serde_json::from_value(page).map_err(DecodeError::Json)?;
            let next = if page.is_complete {
                None
            } else {
                // an incomplete page without a cursor would loop forever
                let cursor = page.cursor.ok_or(ClientError::Path(PathError::MissingKey {
                    key: "cursor".to_owned(),
                    depth: 0,
                }))?;
                let mut params = params;
                params.insert("cursor".to_owned(), cursor);
                Some(params)
            };
            Ok(Some((page.feedback, next)))
        }
    });
    Box::pin(
        pages
            .map_ok(|items| stream::iter(items.into_iter().map(ApiResult::Ok)))
            .try_flatten(),
    )
}

/// Everything in `feed` after the entry whose `key` matches `key`.
///
/// Entries up to and including the match are discarded. If the feed runs out
/// without the key ever appearing, the stream fails with
/// [`ClientError::Identifier`] rather than ending quietly.
pub fn tail_after<'a>(feed: ReplyFeed<'a>, key: &str) -> ReplyFeed<'a> {
    let key = key.to_owned();
    Box::pin(stream::try_unfold(
        (feed, key, false),
        |(mut feed, key, mut found)| async move {
            loop {
                match feed.try_next().await? {
                    Some(entry) => {
                        if found {
                            return Ok(Some((entry, (feed, key, found))));
                        }
                        if str_field(&entry, "key")? == key {
                            found = true;
                        }
                    }
                    None if found => return Ok(None),
                    None => return Err(ClientError::Identifier { id: key }),
                }
            }
        },
    ))
}

/// Scans `feed` for the entry whose `key` matches `key`.
pub async fn find_by_key(mut feed: ReplyFeed<'_>, key: &str) -> ApiResult<Value> {
    while let Some(entry) = feed.try_next().await? {
        if str_field(&entry, "key")? == key {
            return Ok(entry);
        }
    }
    Err(ClientError::Identifier { id: key.to_owned() })
}
