//! Endpoint descriptors and the request helpers built on them.
//!
//! An endpoint is a rendered URL plus the HTTP method to use against it.
//! Content types render their own URLs (substituting their id and any
//! contextual ids) and hand the descriptor to [`fetch_json`] or
//! [`send_expect_ok`], which enforce the raise-on-non-2xx contract.

use bytes::Bytes;
use http::{Method, Request, header::CONTENT_TYPE};
use serde_json::Value;

use crate::error::{ApiResult, ClientError, DecodeError, EncodeError, HttpError, TransportError};
use crate::http_client::HttpClient;

/// Query parameters attached to a request.
///
/// Values serialize through `serde_html_form`, so strings and numbers come
/// out the way the service expects.
pub type Query = serde_json::Map<String, Value>;

/// A rendered API endpoint: URL plus HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// HTTP method to use.
    pub method: Method,
    /// Fully rendered URL.
    pub url: String,
}

impl Endpoint {
    /// GET endpoint.
    pub fn get(url: String) -> Self {
        Self {
            method: Method::GET,
            url,
        }
    }

    /// POST endpoint.
    pub fn post(url: String) -> Self {
        Self {
            method: Method::POST,
            url,
        }
    }

    /// PUT endpoint.
    pub fn put(url: String) -> Self {
        Self {
            method: Method::PUT,
            url,
        }
    }

    /// DELETE endpoint.
    pub fn delete(url: String) -> Self {
        Self {
            method: Method::DELETE,
            url,
        }
    }
}

/// Send a request and parse the response body as JSON.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, query, body),
        fields(method = %endpoint.method, url = %endpoint.url)
    )
)]
pub async fn fetch_json<C>(
    client: &C,
    endpoint: Endpoint,
    query: Option<&Query>,
    body: Option<&Value>,
) -> ApiResult<Value>
where
    C: HttpClient + Sync,
{
    let response = send(client, endpoint, query, body).await?;
    let value = serde_json::from_slice(response.body()).map_err(DecodeError::Json)?;
    Ok(value)
}

/// Send a request, check the status, and discard the response body.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, query, body),
        fields(method = %endpoint.method, url = %endpoint.url)
    )
)]
pub async fn send_expect_ok<C>(
    client: &C,
    endpoint: Endpoint,
    query: Option<&Query>,
    body: Option<&Value>,
) -> ApiResult<()>
where
    C: HttpClient + Sync,
{
    send(client, endpoint, query, body).await?;
    Ok(())
}

/// Shared send path: render the query, build the request, enforce non-2xx.
async fn send<C>(
    client: &C,
    endpoint: Endpoint,
    query: Option<&Query>,
    body: Option<&Value>,
) -> ApiResult<http::Response<Vec<u8>>>
where
    C: HttpClient + Sync,
{
    let mut url = endpoint.url;
    if let Some(params) = query {
        append_query(&mut url, params)?;
    }

    let mut builder = Request::builder().method(endpoint.method).uri(&url);

    let bytes = match body {
        Some(document) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            serde_json::to_vec(document).map_err(EncodeError::Json)?
        }
        None => Vec::new(),
    };

    let request = builder
        .body(bytes)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

    let response = client
        .send_http(request)
        .await
        .map_err(|e| TransportError::Other(Box::new(e)))?;

    if !response.status().is_success() {
        let (parts, body) = response.into_parts();
        return Err(ClientError::Http(HttpError {
            status: parts.status,
            body: Some(Bytes::from(body)),
        }));
    }

    Ok(response)
}

/// Append form-encoded params, respecting any query already in the template.
fn append_query(url: &mut String, params: &Query) -> Result<(), EncodeError> {
    let qs = serde_html_form::to_string(params)?;
    if !qs.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&qs);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Query {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    /// Answers every request with one canned response, keeping the request.
    struct Canned {
        status: u16,
        body: Value,
        seen: Mutex<Option<Request<Vec<u8>>>>,
    }

    impl Canned {
        fn new(status: u16, body: Value) -> Self {
            Self {
                status,
                body,
                seen: Mutex::new(None),
            }
        }
    }

    impl HttpClient for Canned {
        type Error = std::convert::Infallible;

        async fn send_http(
            &self,
            request: Request<Vec<u8>>,
        ) -> core::result::Result<http::Response<Vec<u8>>, Self::Error> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(http::Response::builder()
                .status(self.status)
                .body(serde_json::to_vec(&self.body).unwrap())
                .unwrap())
        }
    }

    #[tokio::test]
    async fn fetch_json_renders_query_and_parses_the_body() {
        let client = Canned::new(200, json!({"kaid": "kaid_1"}));
        let value = fetch_json(
            &client,
            Endpoint::get("https://example.org/user".to_owned()),
            Some(&params(&[("username", json!("ben"))])),
            None,
        )
        .await
        .unwrap();
        assert_eq!(value, json!({"kaid": "kaid_1"}));

        let seen = take(&client);
        assert_eq!(seen.method(), Method::GET);
        assert_eq!(seen.uri().to_string(), "https://example.org/user?username=ben");
        assert!(seen.body().is_empty());
    }

    #[tokio::test]
    async fn bodies_are_sent_as_json() {
        let client = Canned::new(200, json!({}));
        send_expect_ok(
            &client,
            Endpoint::put("https://example.org/doc".to_owned()),
            None,
            Some(&json!({"title": "New"})),
        )
        .await
        .unwrap();

        let seen = take(&client);
        assert_eq!(seen.method(), Method::PUT);
        assert_eq!(seen.headers()[CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(seen.body()).unwrap();
        assert_eq!(body, json!({"title": "New"}));
    }

    #[tokio::test]
    async fn non_2xx_statuses_become_http_errors() {
        let client = Canned::new(500, json!({"error": "boom"}));
        let err = fetch_json(
            &client,
            Endpoint::get("https://example.org/user".to_owned()),
            None,
            None,
        )
        .await
        .unwrap_err();
        match err {
            ClientError::Http(http_err) => {
                assert_eq!(http_err.status, 500);
                assert!(http_err.body.is_some());
            }
            other => panic!("expected an HTTP error, got {other}"),
        }
    }

    fn take(client: &Canned) -> Request<Vec<u8>> {
        client.seen.lock().unwrap().take().expect("no request sent")
    }

    #[test]
    fn append_query_starts_a_query_string() {
        let mut url = "https://example.org/api/user".to_owned();
        append_query(&mut url, &params(&[("kaid", json!("kaid_1"))])).unwrap();
        assert_eq!(url, "https://example.org/api/user?kaid=kaid_1");
    }

    #[test]
    fn append_query_extends_an_existing_one() {
        let mut url = "https://example.org/comments?qa_expand_key=k1".to_owned();
        append_query(&mut url, &params(&[("lang", json!("en"))])).unwrap();
        assert_eq!(url, "https://example.org/comments?qa_expand_key=k1&lang=en");
    }

    #[test]
    fn append_query_serializes_numbers_bare() {
        let mut url = "https://example.org/feed".to_owned();
        append_query(&mut url, &params(&[("limit", json!(10))])).unwrap();
        assert_eq!(url, "https://example.org/feed?limit=10");
    }

    #[test]
    fn empty_params_leave_the_url_alone() {
        let mut url = "https://example.org/feed".to_owned();
        append_query(&mut url, &Query::new()).unwrap();
        assert_eq!(url, "https://example.org/feed");
    }
}
