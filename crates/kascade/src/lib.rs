//! # Kascade
//!
//! Client library for Khan Academy's internal content API.
//!
//! The API is undocumented JSON over HTTP; this crate maps it onto a small
//! content model. Every entity is a cheap handle built from identifiers, and
//! every data-bearing operation is lazy: field reads fetch the backing
//! metadata document on each call and resolve a declared dict path into it,
//! so nothing is cached and nothing goes stale on the handle.
//!
//! Capabilities — editing, replying, deleting — are independent traits a
//! type opts into, with the shared mechanics living in free functions. What
//! a type can do is visible in its trait list.
//!
//! ## Example
//!
//! Read a program's title, then retitle it:
//!
//! ```no_run
//! use kascade::{Editable, Program};
//! use serde_json::json;
//!
//! # async fn demo(session: &(impl kascade::http_client::HttpClient + Sync)) -> kascade::ApiResult<()> {
//! let program = Program::new("4617827881975808");
//! println!("{}", program.title(session).await?);
//! program.edit(session, &[("title", json!("Renamed"))]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The session argument is any [`http_client::HttpClient`]; authenticated
//! operations want one wrapped by an external login flow (see
//! [`session::KaSession`]).

#![warn(missing_docs)]

pub mod capability;
pub mod comment;
pub mod content;
pub mod feed;
pub mod program;
pub mod session;
pub mod urls;
pub mod user;

pub use kascade_common::dictpath;
pub use kascade_common::endpoint;
pub use kascade_common::error;
pub use kascade_common::http_client;
pub use kascade_common::{ApiResult, ClientError, FieldError};
pub use serde_json;

pub use capability::{Deletable, Editable, Questionable, Replyable, Spinoffable};
pub use comment::{Comment, ProgramComment, ProgramCommentReply};
pub use content::Content;
pub use feed::ReplyFeed;
pub use program::{Program, ProgramContext};
pub use session::KaSession;
pub use user::User;
