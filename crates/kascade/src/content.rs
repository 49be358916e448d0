//! The content identity contract and the metadata path-map mechanism.
//!
//! Every entity the API exposes is a [`Content`]: a handle built purely from
//! identifiers, with all data-bearing operations happening lazily at call
//! time. Metadata is re-fetched on every access and never cached on the
//! handle; this mirrors the service's behavior deliberately, so two reads of
//! the same field may disagree if the server-side document changed between
//! them.

use std::future::Future;

use serde_json::Value;

use crate::dictpath::{self, Seg};
use crate::endpoint::{Endpoint, fetch_json};
use crate::error::{ApiResult, ClientError, FieldError};
use crate::http_client::HttpClient;

/// Per-type mapping from friendly field name to dict path.
///
/// Maps chain through `parent`, and [`MetaPathMap::resolve`] searches own
/// entries first, so a type redeclaring an inherited field name wins.
#[derive(Debug)]
pub struct MetaPathMap {
    /// Field names and their dict paths, declared on this type.
    pub entries: &'static [(&'static str, &'static [Seg])],
    /// Map this one augments, if any.
    pub parent: Option<&'static MetaPathMap>,
}

impl MetaPathMap {
    /// A map with no fields and no parent.
    pub const EMPTY: MetaPathMap = MetaPathMap {
        entries: &[],
        parent: None,
    };

    /// Looks up the dict path declared for `name`, own entries first.
    pub fn resolve(&self, name: &str) -> Option<&'static [Seg]> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, path)| *path)
            .or_else(|| self.parent.and_then(|parent| parent.resolve(name)))
    }

    /// Iterates every field name reachable through this map, nearest
    /// declaration first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        let mut chain = Vec::new();
        let mut cur = Some(self);
        while let Some(map) = cur {
            chain.push(map);
            cur = map.parent;
        }
        chain
            .into_iter()
            .flat_map(|map| map.entries.iter().map(|(name, _)| *name))
    }
}

/// A thing that can be accessed through the content API.
pub trait Content {
    /// Opaque stable identifier for this item.
    fn id(&self) -> &str;

    /// Endpoint that serves this item's metadata.
    fn api_get(&self) -> Endpoint;

    /// This type's metadata path map.
    fn path_map(&self) -> &'static MetaPathMap {
        &MetaPathMap::EMPTY
    }

    /// Fetches this item's metadata as a JSON document.
    ///
    /// Issues a GET against [`Content::api_get`] on every call; non-2xx
    /// responses propagate. Types with quirky metadata shapes override this.
    fn metadata<C>(&self, client: &C) -> impl Future<Output = ApiResult<Value>> + Send
    where
        C: HttpClient + Sync,
        Self: Sync,
    {
        fetch_metadata(self, client)
    }

    /// Whether two content items refer to the same entity.
    ///
    /// Identity is the id alone, regardless of concrete type: a comment and a
    /// program sharing an id string compare the same. Deliberate, and
    /// dangerous enough to be worth knowing about.
    fn same_content<T: Content + ?Sized>(&self, other: &T) -> bool {
        self.id() == other.id()
    }
}

/// Plain metadata fetch: GET the item's endpoint and parse the body.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(item, client), fields(id = item.id()))
)]
pub async fn fetch_metadata<T, C>(item: &T, client: &C) -> ApiResult<Value>
where
    T: Content + ?Sized + Sync,
    C: HttpClient + Sync,
{
    fetch_json(client, item.api_get(), None, None).await
}

/// Reads one named field by resolving its path against fresh metadata.
///
/// This is the shared resolver behind both the generated accessors and the
/// trait-level ones; the path comes from [`Content::path_map`], so a subtype
/// redeclaring `name` is honored.
pub async fn field<T, C>(item: &T, client: &C, name: &str) -> ApiResult<Value>
where
    T: Content + ?Sized + Sync,
    C: HttpClient + Sync,
{
    let path = item
        .path_map()
        .resolve(name)
        .ok_or_else(|| FieldError::Unknown {
            field: name.to_owned(),
        })?;
    let metadata = item.metadata(client).await?;
    match dictpath::get(&metadata, path) {
        Ok(value) => Ok(value.clone()),
        Err(source) => Err(FieldError::Unresolved {
            field: name.to_owned(),
            source,
        }
        .into()),
    }
}

/// Reads a required string directly under the document root.
pub(crate) fn str_field<'a>(document: &'a Value, key: &str) -> ApiResult<&'a str> {
    document
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ClientError::Path(dictpath::PathError::MissingKey {
                key: key.to_owned(),
                depth: 0,
            })
        })
}

/// Declares a content type's metadata path map and generates its accessors.
///
/// For every `name => [path]` pair this emits a read accessor of the same
/// name on the type: an async method that fetches metadata through
/// [`Content::metadata`] and resolves the declared path. Fields that need a
/// hand-written accessor are simply left out of the declaration (the
/// collision would not compile anyway) and routed through the map some other
/// way.
///
/// ```ignore
/// meta_path_map! {
///     pub static PROGRAM_MAP for Program {
///         code => ["revision", "code"],
///         title => ["title"],
///     }
/// }
/// ```
///
/// A `parent: OTHER_MAP;` line chains this map onto another one for
/// resolution, nearest declaration first. The map-only form (no `for Type`)
/// declares a map without generating accessors, for field sets shared across
/// several types.
#[macro_export]
macro_rules! meta_path_map {
    ($(#[$attr:meta])* $vis:vis static $map:ident for $ty:ty {
        parent: $parent:path;
        $($field:ident => [$($seg:literal),+ $(,)?]),* $(,)?
    }) => {
        $crate::meta_path_map!(@map $(#[$attr])* $vis $map
            (::core::option::Option::Some(&$parent))
            { $($field => [$($seg),+]),* });
        $crate::meta_path_map!(@accessors $ty { $($field => [$($seg),+]),* });
    };
    ($(#[$attr:meta])* $vis:vis static $map:ident for $ty:ty {
        $($field:ident => [$($seg:literal),+ $(,)?]),* $(,)?
    }) => {
        $crate::meta_path_map!(@map $(#[$attr])* $vis $map
            (::core::option::Option::None)
            { $($field => [$($seg),+]),* });
        $crate::meta_path_map!(@accessors $ty { $($field => [$($seg),+]),* });
    };
    ($(#[$attr:meta])* $vis:vis static $map:ident {
        $($field:ident => [$($seg:literal),+ $(,)?]),* $(,)?
    }) => {
        $crate::meta_path_map!(@map $(#[$attr])* $vis $map
            (::core::option::Option::None)
            { $($field => [$($seg),+]),* });
    };
    (@map $(#[$attr:meta])* $vis:vis $map:ident ($parent:expr) {
        $($field:ident => [$($seg:literal),+]),*
    }) => {
        $(#[$attr])*
        $vis static $map: $crate::content::MetaPathMap = $crate::content::MetaPathMap {
            entries: &[$(
                (
                    stringify!($field),
                    &[$($crate::dictpath::Seg::Key($seg)),+] as &[$crate::dictpath::Seg],
                )
            ),*],
            parent: $parent,
        };
    };
    (@accessors $ty:ty { $($field:ident => [$($seg:literal),+]),* }) => {
        impl $ty {
            $(
                #[doc = concat!("Reads `", stringify!($field), "` from freshly fetched metadata.")]
                pub async fn $field<C>(&self, client: &C) -> $crate::ApiResult<$crate::serde_json::Value>
                where
                    C: $crate::http_client::HttpClient + ::core::marker::Sync,
                {
                    let metadata = $crate::content::Content::metadata(self, client).await?;
                    let path: &[$crate::dictpath::Seg] =
                        &[$($crate::dictpath::Seg::Key($seg)),+];
                    match $crate::dictpath::get(&metadata, path) {
                        ::core::result::Result::Ok(value) =>
                            ::core::result::Result::Ok(value.clone()),
                        ::core::result::Result::Err(source) =>
                            ::core::result::Result::Err($crate::FieldError::Unresolved {
                                field: stringify!($field).to_owned(),
                                source,
                            }.into()),
                    }
                }
            )*
        }
    };
}
