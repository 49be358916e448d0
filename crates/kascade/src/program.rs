//! Programs ("scratchpads") and the context they give to comments.

use std::future::Future;

use serde_json::Value;

use crate::capability::{Deletable, Editable, Questionable, Replyable, Spinoffable};
use crate::comment::ProgramComment;
use crate::content::{Content, MetaPathMap, fetch_metadata};
use crate::dictpath::{self, Seg};
use crate::endpoint::{Endpoint, Query};
use crate::error::ApiResult;
use crate::feed::{self, ReplyFeed};
use crate::http_client::HttpClient;
use crate::urls::ka_url;

/// Anything scoped to a program: the program itself, or a comment living on
/// one. Comment constructors take any context rather than a `Program`
/// specifically, so a comment can be built from another comment.
pub trait ProgramContext {
    /// Id of the program this item is scoped to.
    fn program_id(&self) -> &str;
}

/// A program on the site, e.g. one created under `/computer-programming/new`.
///
/// The program id is the last path segment of the program's URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    program_id: String,
}

crate::meta_path_map! {
    /// Fields exposed on a scratchpad document.
    pub static PROGRAM_MAP for Program {
        image_url => ["revision", "imageUrl"],
        url => ["url"],
        code => ["revision", "code"],
        width => ["width"],
        height => ["height"],
        title => ["title"],
        kind => ["userAuthoredContentType"],
    }
}

impl Program {
    /// Builds a program handle from its id. No network call happens here.
    pub fn new(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
        }
    }

    fn scratchpad_url(&self) -> String {
        ka_url(format!("api/internal/scratchpads/{}", self.program_id))
    }

    /// Reply feed with caller-supplied query overrides merged over the
    /// defaults.
    pub fn reply_data_with<'a, C>(&'a self, client: &'a C, params: Query) -> ReplyFeed<'a>
    where
        C: HttpClient + Sync,
    {
        let mut merged = feed::default_params();
        merged.extend(params);
        feed::paginated(client, Endpoint::get(self.reply_url()), merged)
    }
}

impl ProgramContext for Program {
    fn program_id(&self) -> &str {
        &self.program_id
    }
}

impl Content for Program {
    /// A program's id is its program id.
    fn id(&self) -> &str {
        &self.program_id
    }

    fn api_get(&self) -> Endpoint {
        Endpoint::get(self.scratchpad_url())
    }

    fn path_map(&self) -> &'static MetaPathMap {
        &PROGRAM_MAP
    }

    fn metadata<C>(&self, client: &C) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        async move {
            let mut metadata = fetch_metadata(self, client).await?;
            // the server reports imageUrl at top level; the path map expects
            // it under revision
            let image_url = metadata.get("imageUrl").cloned().unwrap_or(Value::Null);
            dictpath::set(
                &mut metadata,
                &[Seg::Key("revision"), Seg::Key("imageUrl")],
                image_url,
            )?;
            Ok(metadata)
        }
    }
}

impl Editable for Program {
    fn api_edit(&self) -> Endpoint {
        Endpoint::put(self.scratchpad_url())
    }
}

impl Deletable for Program {
    fn api_delete(&self) -> Endpoint {
        Endpoint::delete(self.scratchpad_url())
    }
}

impl Replyable for Program {
    type Reply = ProgramComment;

    fn reply_url(&self) -> String {
        ka_url(format!(
            "api/internal/discussions/scratchpad/{}/comments",
            self.program_id
        ))
    }

    fn reply_from_key(&self, key: String) -> ProgramComment {
        ProgramComment::new(key, self)
    }

    fn reply_data<'a, C>(&'a self, client: &'a C) -> ReplyFeed<'a>
    where
        C: HttpClient + Sync,
    {
        feed::paginated(
            client,
            Endpoint::get(self.reply_url()),
            feed::default_params(),
        )
    }
}

impl Questionable for Program {}

impl Spinoffable for Program {}
