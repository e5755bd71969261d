use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::messages::{FlashMessage, FORM_ERROR_MESSAGE};
use contracts::shared::validation::FieldErrors;
use serde_json::{json, Value};

use super::context::ViewContext;
use super::flash;

/// Body returned for any unexpected failure of an AJAX request
pub const AJAX_ERROR_MESSAGE: &str = "Error processing request";
pub const NOT_FOUND_MESSAGE: &str = "Not found.";

/// What a handler produced, before it is shaped into a page or an AJAX payload
#[derive(Debug)]
pub enum ViewOutcome {
    /// Page data, rendered at 200
    Page(Value),
    /// Submitted form redisplayed with its errors
    Form { form: Value, errors: FieldErrors },
    /// Redirect that leaves a one-time notice for the next page
    Redirect {
        location: String,
        message: FlashMessage,
    },
    /// Request refused without a form to redisplay. Pages are redirected with
    /// the notice, AJAX callers get an error payload.
    Refused {
        location: String,
        message: FlashMessage,
    },
    /// The requested singleton has not been recorded yet
    NoInformation,
    NotFound,
}

impl ViewOutcome {
    pub fn redirect(location: impl Into<String>, message: FlashMessage) -> Self {
        ViewOutcome::Redirect {
            location: location.into(),
            message,
        }
    }

    pub fn refused(location: impl Into<String>, message: FlashMessage) -> Self {
        ViewOutcome::Refused {
            location: location.into(),
            message,
        }
    }
}

/// Shape a handler result into the response for this request.
/// Errors are logged and never exposed to the client.
pub fn render(ctx: ViewContext, outcome: anyhow::Result<ViewOutcome>) -> Response {
    match outcome {
        Ok(outcome) if ctx.ajax => render_ajax(outcome),
        Ok(outcome) => render_page(ctx.messages, outcome),
        Err(e) => {
            tracing::error!("Request failed: {:#}", e);
            server_error(ctx.ajax)
        }
    }
}

/// Generic 500 response
pub fn server_error(ajax: bool) -> Response {
    let body = if ajax {
        json!({ "error": AJAX_ERROR_MESSAGE })
    } else {
        json!({ "error": "Internal server error" })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn render_ajax(outcome: ViewOutcome) -> Response {
    let (status, body) = match outcome {
        ViewOutcome::Page(data) => (StatusCode::OK, json!({ "status": "success", "data": data })),
        ViewOutcome::Form { errors, .. } => (
            StatusCode::BAD_REQUEST,
            json!({ "status": "error", "message": FORM_ERROR_MESSAGE, "errors": errors }),
        ),
        ViewOutcome::Redirect { location, message } => (
            StatusCode::OK,
            json!({ "status": "success", "message": message.text, "redirect": location }),
        ),
        ViewOutcome::Refused { location, message } => (
            StatusCode::CONFLICT,
            json!({ "status": "error", "message": message.text, "redirect": location }),
        ),
        ViewOutcome::NoInformation => (StatusCode::OK, json!({ "status": "no_information" })),
        ViewOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            json!({ "status": "error", "message": NOT_FOUND_MESSAGE }),
        ),
    };
    (status, Json(body)).into_response()
}

fn render_page(pending: Vec<FlashMessage>, outcome: ViewOutcome) -> Response {
    match outcome {
        ViewOutcome::Page(data) => page(StatusCode::OK, data, pending, Vec::new()),
        ViewOutcome::Form { form, errors } => page(
            StatusCode::OK,
            json!({ "form": form, "errors": errors }),
            pending,
            vec![FlashMessage::error(FORM_ERROR_MESSAGE)],
        ),
        ViewOutcome::NoInformation => page(
            StatusCode::OK,
            json!({ "status": "no_information" }),
            pending,
            Vec::new(),
        ),
        ViewOutcome::Redirect { location, message }
        | ViewOutcome::Refused { location, message } => {
            let mut messages = pending;
            messages.push(message);
            let mut response = StatusCode::SEE_OTHER.into_response();
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => {
                    tracing::error!("Invalid redirect location {}: {}", location, e);
                    return server_error(false);
                }
            }
            if let Some(cookie) = flash::store(&messages) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
        // Pending notices stay in the cookie for the next rendered page
        ViewOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": NOT_FOUND_MESSAGE })),
        )
            .into_response(),
    }
}

/// Page body with the pending notices attached under `messages`.
/// Delivering pending notices consumes the flash cookie.
fn page(
    status: StatusCode,
    data: Value,
    pending: Vec<FlashMessage>,
    extra: Vec<FlashMessage>,
) -> Response {
    let consumed = !pending.is_empty();
    let mut messages = pending;
    messages.extend(extra);

    let mut body = match data {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    body.insert("messages".to_string(), json!(messages));

    let mut response = (status, Json(Value::Object(body))).into_response();
    if consumed {
        response.headers_mut().append(header::SET_COOKIE, flash::clear());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn page_ctx(messages: Vec<FlashMessage>) -> ViewContext {
        ViewContext {
            ajax: false,
            messages,
        }
    }

    fn ajax_ctx() -> ViewContext {
        ViewContext {
            ajax: true,
            messages: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_page_consumes_pending_messages() {
        let ctx = page_ctx(vec![FlashMessage::success("Product created successfully.")]);
        let response = render(ctx, Ok(ViewOutcome::Page(json!({ "entity": "Products" }))));

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
        let body = body_json(response).await;
        assert_eq!(body["entity"], "Products");
        assert_eq!(body["messages"][0]["text"], "Product created successfully.");
        assert_eq!(body["messages"][0]["level"], "success");
    }

    #[tokio::test]
    async fn test_page_without_messages_leaves_cookie_alone() {
        let response = render(page_ctx(Vec::new()), Ok(ViewOutcome::Page(json!({}))));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_form_errors_render_at_200_with_notice() {
        let outcome = ViewOutcome::Form {
            form: json!({ "name": "" }),
            errors: FieldErrors::single("name", "This field is required."),
        };
        let response = render(page_ctx(Vec::new()), Ok(outcome));

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["errors"]["fields"]["name"][0], "This field is required.");
        assert_eq!(body["messages"][0]["text"], FORM_ERROR_MESSAGE);
        assert_eq!(body["messages"][0]["level"], "error");
    }

    #[tokio::test]
    async fn test_redirect_sets_flash_cookie() {
        let outcome = ViewOutcome::redirect("/worker/", FlashMessage::success("Worker created successfully."));
        let response = render(page_ctx(Vec::new()), Ok(outcome));

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/worker/");
        let mut headers = axum::http::HeaderMap::new();
        let pair = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(pair.split(';').next().unwrap()).unwrap(),
        );
        assert_eq!(
            flash::read(&headers),
            vec![FlashMessage::success("Worker created successfully.")]
        );
    }

    #[tokio::test]
    async fn test_ajax_payloads() {
        let response = render(ajax_ctx(), Ok(ViewOutcome::NoInformation));
        assert_eq!(body_json(response).await, json!({ "status": "no_information" }));

        let outcome = ViewOutcome::redirect("/product/", FlashMessage::success("Product deleted successfully."));
        let response = render(ajax_ctx(), Ok(outcome));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["redirect"], "/product/");

        let response = render(ajax_ctx(), Ok(ViewOutcome::NotFound));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_refused_is_an_error_for_ajax_only() {
        let refused = || {
            ViewOutcome::refused(
                "/company/",
                FlashMessage::warning("Company information already exists. You can edit it."),
            )
        };

        let response = render(page_ctx(Vec::new()), Ok(refused()));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/company/");
        assert!(response.headers().get(header::SET_COOKIE).is_some());

        let response = render(ajax_ctx(), Ok(refused()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Company information already exists. You can edit it.");
        assert_eq!(body["redirect"], "/company/");
    }

    #[tokio::test]
    async fn test_ajax_failure_is_generic() {
        let response = render(ajax_ctx(), Err(anyhow::anyhow!("connection reset by peer")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Error processing request" })
        );
    }
}
