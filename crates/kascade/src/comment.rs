//! Comments on programs, and replies to those comments.
//!
//! The service's comment API is quirky: there is no direct lookup for a
//! reply, and expanding a comment key returns a list whose first element is
//! the record actually asked for. The types here wrap those quirks rather
//! than hiding them — errors from empty expansions and fruitless feed scans
//! surface to the caller.

use std::future::Future;

use futures::stream::{self, TryStreamExt};
use serde_json::Value;

use crate::capability::{Deletable, Editable, Replyable};
use crate::content::{self, Content, MetaPathMap, fetch_metadata, str_field};
use crate::dictpath::{self, Seg};
use crate::endpoint::Endpoint;
use crate::error::{ApiResult, FieldError};
use crate::feed::{self, ReplyFeed};
use crate::http_client::HttpClient;
use crate::program::{Program, ProgramContext};
use crate::urls::ka_url;
use crate::user::User;

crate::meta_path_map! {
    /// Fields every kind of comment exposes, wherever it lives.
    pub static COMMENT_MAP {
        text_content => ["content"],
    }
}

/// Behavior shared by every kind of comment.
pub trait Comment: Content {
    /// The [`User`] who wrote this comment.
    fn author<C>(&self, client: &C) -> impl Future<Output = ApiResult<User>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        async move {
            let metadata = self.metadata(client).await?;
            Ok(User::new(str_field(&metadata, "authorKaid")?))
        }
    }

    /// Reads `text_content` through the comment path map.
    fn text_content<C>(&self, client: &C) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        content::field(self, client, "text_content")
    }
}

/// Delete endpoint shared by all comments, wherever they live.
fn feedback_endpoint(id: &str) -> Endpoint {
    Endpoint::delete(ka_url(format!("api/internal/feedback/{id}")))
}

/// Reply-thread URL shared by all comments.
fn thread_replies_url(id: &str) -> String {
    ka_url(format!("api/internal/discussions/{id}/replies"))
}

/// Comment-expansion URL: the response lists the whole thread, requested
/// entry first.
fn expansion_url(program_id: &str, key: &str) -> String {
    ka_url(format!(
        "api/internal/discussions/scratchpad/{program_id}/comments?qa_expand_key={key}"
    ))
}

/// A comment on a program.
///
/// Identified by a comment key (usually a long string starting with
/// `kaencrypted_`) plus the program it lives on.
#[derive(Debug, Clone, Eq)]
pub struct ProgramComment {
    key: String,
    program_id: String,
}

// Identity is the comment key alone; the program id is routing context.
impl PartialEq for ProgramComment {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl std::hash::Hash for ProgramComment {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

crate::meta_path_map! {
    /// Program comments add nothing of their own to the comment fields.
    pub static PROGRAM_COMMENT_MAP for ProgramComment {
        parent: COMMENT_MAP;
    }
}

impl ProgramComment {
    /// Builds a comment handle from its key and any program context.
    /// No network call happens here.
    pub fn new(key: impl Into<String>, context: &impl ProgramContext) -> Self {
        Self {
            key: key.into(),
            program_id: context.program_id().to_owned(),
        }
    }

    /// The [`Program`] this comment was posted on.
    pub fn program(&self) -> Program {
        Program::new(self.program_id.clone())
    }

    /// Program page URL that opens with this comment thread expanded.
    pub async fn url<C>(&self, client: &C) -> ApiResult<String>
    where
        C: HttpClient + Sync,
    {
        let metadata = Content::metadata(&self.program(), client).await?;
        let program_url = str_field(&metadata, "url")?;
        Ok(format!("{program_url}?qa_expand_key={}", self.key))
    }
}

impl ProgramContext for ProgramComment {
    fn program_id(&self) -> &str {
        &self.program_id
    }
}

impl Content for ProgramComment {
    /// Comments use their comment key for identification.
    fn id(&self) -> &str {
        &self.key
    }

    fn api_get(&self) -> Endpoint {
        Endpoint::get(expansion_url(&self.program_id, &self.key))
    }

    fn path_map(&self) -> &'static MetaPathMap {
        &PROGRAM_COMMENT_MAP
    }

    fn metadata<C>(&self, client: &C) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        async move {
            // with qa_expand_key the requested thread comes first, so this
            // comment's own record is feedback[0]; an empty expansion is an
            // error, not a silent miss
            let expansion = fetch_metadata(self, client).await?;
            match dictpath::get(&expansion, &[Seg::Key("feedback"), Seg::Index(0)]) {
                Ok(value) => Ok(value.clone()),
                Err(source) => Err(FieldError::Unresolved {
                    field: "feedback".to_owned(),
                    source,
                }
                .into()),
            }
        }
    }
}

impl Comment for ProgramComment {}

impl Editable for ProgramComment {
    fn api_edit(&self) -> Endpoint {
        Endpoint::put(ka_url(format!(
            "api/internal/discussions/scratchpad/{}/comments/{}",
            self.program_id, self.key
        )))
    }
}

impl Deletable for ProgramComment {
    fn api_delete(&self) -> Endpoint {
        feedback_endpoint(&self.key)
    }
}

impl Replyable for ProgramComment {
    type Reply = ProgramCommentReply;

    fn reply_url(&self) -> String {
        thread_replies_url(&self.key)
    }

    fn reply_from_key(&self, key: String) -> ProgramCommentReply {
        ProgramCommentReply::new(key, self)
    }

    fn reply_data<'a, C>(&'a self, client: &'a C) -> ReplyFeed<'a>
    where
        C: HttpClient + Sync,
    {
        feed::listed(client, Endpoint::get(self.reply_url()))
    }
}

/// A reply in a program comment's thread.
///
/// The API has no direct lookup for replies, so metadata and the reply feed
/// both come from scanning the thread root's feed for this reply's key.
#[derive(Debug, Clone, Eq)]
pub struct ProgramCommentReply {
    key: String,
    program_id: String,
}

// Identity is the comment key alone; the program id is routing context.
impl PartialEq for ProgramCommentReply {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl std::hash::Hash for ProgramCommentReply {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl ProgramCommentReply {
    /// Builds a reply handle from its key and any program context.
    /// No network call happens here.
    pub fn new(key: impl Into<String>, context: &impl ProgramContext) -> Self {
        Self {
            key: key.into(),
            program_id: context.program_id().to_owned(),
        }
    }

    /// The [`Program`] this reply's thread lives on.
    pub fn program(&self) -> Program {
        Program::new(self.program_id.clone())
    }

    /// The [`ProgramComment`] that started the thread.
    ///
    /// Expanding a reply key returns the whole thread with the root first,
    /// so this costs a network round-trip.
    pub async fn parent<C>(&self, client: &C) -> ApiResult<ProgramComment>
    where
        C: HttpClient + Sync,
    {
        let probe = ProgramComment::new(self.key.clone(), self);
        let root = Content::metadata(&probe, client).await?;
        Ok(ProgramComment::new(str_field(&root, "key")?, self))
    }

    /// Program page URL that opens with this reply's thread expanded.
    pub async fn url<C>(&self, client: &C) -> ApiResult<String>
    where
        C: HttpClient + Sync,
    {
        let metadata = Content::metadata(&self.program(), client).await?;
        let program_url = str_field(&metadata, "url")?;
        Ok(format!("{program_url}?qa_expand_key={}", self.key))
    }
}

impl ProgramContext for ProgramCommentReply {
    fn program_id(&self) -> &str {
        &self.program_id
    }
}

impl Content for ProgramCommentReply {
    /// Replies use their comment key for identification.
    fn id(&self) -> &str {
        &self.key
    }

    fn api_get(&self) -> Endpoint {
        Endpoint::get(expansion_url(&self.program_id, &self.key))
    }

    fn path_map(&self) -> &'static MetaPathMap {
        &PROGRAM_COMMENT_MAP
    }

    fn metadata<C>(&self, client: &C) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        async move {
            // no direct lookup exists; walk the thread until our key shows up
            let root = self.parent(client).await?;
            feed::find_by_key(root.reply_data(client), &self.key).await
        }
    }
}

impl Comment for ProgramCommentReply {}

impl Editable for ProgramCommentReply {
    fn api_edit(&self) -> Endpoint {
        Endpoint::put(ka_url(format!(
            "api/internal/discussions/scratchpad/{}/comments/{}",
            self.program_id, self.key
        )))
    }
}

impl Deletable for ProgramCommentReply {
    fn api_delete(&self) -> Endpoint {
        feedback_endpoint(&self.key)
    }
}

impl Replyable for ProgramCommentReply {
    type Reply = ProgramCommentReply;

    fn reply_url(&self) -> String {
        thread_replies_url(&self.key)
    }

    fn reply_from_key(&self, key: String) -> ProgramCommentReply {
        ProgramCommentReply::new(key, self)
    }

    /// Everything in the thread posted after this reply.
    fn reply_data<'a, C>(&'a self, client: &'a C) -> ReplyFeed<'a>
    where
        C: HttpClient + Sync,
    {
        Box::pin(
            stream::once(async move {
                let root = self.parent(client).await?;
                let thread = feed::listed(client, Endpoint::get(thread_replies_url(root.id())));
                ApiResult::Ok(feed::tail_after(thread, &self.key))
            })
            .try_flatten(),
        )
    }

    /// Replies to a reply land on the thread root, prefixed with
    /// `"@{author}: "` so it stays clear what is being replied to. To skip
    /// the prefix, reply through [`ProgramCommentReply::parent`] instead.
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
        async move {
            let metadata = Content::metadata(self, session).await?;
            let author = str_field(&metadata, "authorNickname")?;
            let message = format!("@{author}: {message}");
            let root = self.parent(session).await?;
            root.reply_with_topic(session, &message, topic).await
        }
    }
}
