//! Body codecs: turning outgoing bodies into payloads and responses into
//! plain values.
//!
//! Both handlers are configurable (see [`Config`](crate::Config)); the
//! defaults are [`default_request_body_handler`] and
//! [`default_response_body_handler`].

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::{Payload, QueryParams, Response};
use crate::rest::errors::{ApplicationError, ResourceError};
use crate::rest::item::Item;

/// An outgoing request body, before encoding.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// URL-encoded form fields.
    Form(QueryParams),
    /// Plain text.
    Text(String),
    /// Raw bytes with an optional content type.
    Bytes {
        /// The body bytes.
        data: Bytes,
        /// The declared content type, if any.
        content_type: Option<String>,
    },
}

impl Body {
    /// Serializes any `Serialize` value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Encoding`] if serialization fails.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ResourceError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ResourceError::Encoding {
                message: e.to_string(),
            })
    }

    /// Returns `true` if there is no body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Map<String, Value>> for Body {
    fn from(map: Map<String, Value>) -> Self {
        Self::Json(Value::Object(map))
    }
}

impl From<&Item> for Body {
    fn from(item: &Item) -> Self {
        Self::Json(item.plain())
    }
}

impl From<Item> for Body {
    fn from(item: Item) -> Self {
        Self::from(&item)
    }
}

impl From<QueryParams> for Body {
    fn from(fields: QueryParams) -> Self {
        Self::Form(fields)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(data: Bytes) -> Self {
        Self::Bytes {
            data,
            content_type: None,
        }
    }
}

impl<T: Into<Self>> From<Option<T>> for Body {
    fn from(body: Option<T>) -> Self {
        body.map_or(Self::Empty, Into::into)
    }
}

/// Encodes a [`Body`] into a transport-ready [`Payload`].
pub type RequestBodyHandler = Arc<dyn Fn(Body) -> Result<Payload, ResourceError> + Send + Sync>;

/// Decodes a transport [`Response`] into a plain value or a failure.
pub type ResponseBodyHandler =
    Arc<dyn Fn(Response) -> BoxFuture<'static, Result<Value, ResourceError>> + Send + Sync>;

/// The default request body handler.
///
/// JSON bodies (including items, which arrive as their plain element) are
/// serialized; form, text and byte bodies pass through unchanged.
///
/// # Errors
///
/// Returns [`ResourceError::Encoding`] if a JSON body cannot be serialized.
pub fn default_request_body_handler(body: Body) -> Result<Payload, ResourceError> {
    Ok(match body {
        Body::Empty => Payload::Empty,
        Body::Json(value) => {
            Payload::Json(
                serde_json::to_string(&value).map_err(|e| ResourceError::Encoding {
                    message: e.to_string(),
                })?,
            )
        }
        Body::Form(fields) => Payload::Form(fields),
        Body::Text(text) => Payload::Text(text),
        Body::Bytes { data, content_type } => Payload::Bytes { data, content_type },
    })
}

/// The default response body handler.
///
/// See [`decode_response`].
pub fn default_response_body_handler(
    response: Response,
) -> BoxFuture<'static, Result<Value, ResourceError>> {
    async move { decode_response(&response) }.boxed()
}

/// Classifies and decodes a buffered response.
///
/// - 4xx/5xx: [`ResourceError::Application`]
/// - 204 or an empty body: `Value::Null`, nothing is parsed
/// - a JSON content type: the parsed document
/// - anything else: the body as a string
///
/// # Errors
///
/// Returns [`ResourceError::Application`] for failing statuses and
/// [`ResourceError::Decoding`] when a body declared as JSON does not parse.
pub fn decode_response(response: &Response) -> Result<Value, ResourceError> {
    if !response.is_ok() {
        return Err(ApplicationError::from_response(response).into());
    }
    if response.is_empty() {
        return Ok(Value::Null);
    }
    if response.is_json() {
        return serde_json::from_slice(&response.body)
            .map_err(|e| ResourceError::decoding(e.to_string()));
    }
    Ok(Value::String(response.text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Headers;
    use serde_json::json;

    #[test]
    fn test_json_body_is_serialized() {
        let payload = default_request_body_handler(Body::Json(json!({"name": "Ada"}))).unwrap();
        assert_eq!(payload, Payload::Json(r#"{"name":"Ada"}"#.to_string()));
    }

    #[test]
    fn test_native_payloads_pass_through() {
        let form = QueryParams::from([("a", "1")]);
        assert_eq!(
            default_request_body_handler(Body::Form(form.clone())).unwrap(),
            Payload::Form(form)
        );
        assert_eq!(
            default_request_body_handler(Body::from("hi")).unwrap(),
            Payload::Text("hi".to_string())
        );
        assert_eq!(
            default_request_body_handler(Body::Empty).unwrap(),
            Payload::Empty
        );
        assert_eq!(
            default_request_body_handler(Body::from(Bytes::from_static(b"\x00\x01"))).unwrap(),
            Payload::Bytes {
                data: Bytes::from_static(b"\x00\x01"),
                content_type: None,
            }
        );
    }

    #[test]
    fn test_body_from_serializable() {
        #[derive(Serialize)]
        struct NewUser {
            name: &'static str,
        }

        let body = Body::json(&NewUser { name: "Ada" }).unwrap();
        assert_eq!(body, Body::Json(json!({"name": "Ada"})));
    }

    #[test]
    fn test_body_from_option() {
        assert!(Body::from(None::<Value>).is_empty());
        assert_eq!(Body::from(Some(json!(1))), Body::Json(json!(1)));
    }

    #[test]
    fn test_decode_json_response() {
        let response = Response::json(200, &json!([{"id": 1}]));
        assert_eq!(decode_response(&response).unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn test_decode_text_response() {
        let response = Response::new(200, Headers::from([("content-type", "text/plain")]), "pong");
        assert_eq!(decode_response(&response).unwrap(), json!("pong"));
    }

    #[test]
    fn test_decode_no_content_skips_parsing() {
        let response = Response::new(
            204,
            Headers::from([("content-type", "application/json")]),
            "",
        );
        assert_eq!(decode_response(&response).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_failing_status_is_application_error() {
        let response = Response::json(404, &json!({"error": "no such user"}));
        let error = decode_response(&response).unwrap_err();

        match error {
            ResourceError::Application(e) => {
                assert_eq!(e.name, "Not Found");
                assert_eq!(e.message, "no such user");
                assert_eq!(e.status, 404);
            }
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed_json_is_decoding_error() {
        let response = Response::new(
            200,
            Headers::from([("content-type", "application/json")]),
            "{not json",
        );
        assert!(matches!(
            decode_response(&response),
            Err(ResourceError::Decoding { .. })
        ));
    }

    #[tokio::test]
    async fn test_default_response_handler_is_async_wrapper() {
        let value = default_response_body_handler(Response::json(201, &json!({"id": 9})))
            .await
            .unwrap();
        assert_eq!(value, json!({"id": 9}));
    }
}
