//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never reach the logs.
const REDACTED_FIELDS: [&str; 1] = ["code"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// One-time codes in submitted forms are replaced with asterisks.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = body_to_string(body).await;

    let is_form_post = parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form_post {
        let display_text = REDACTED_FIELDS
            .iter()
            .fold(body_text.clone(), |text, field| redact_field(&text, field));
        log_body("Received request", &parts, &display_text);
    } else {
        log_body("Received request", &parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = body_to_string(body).await;
    log_body("Sending response", &parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Replace the value of `field_name` in a URL encoded form with asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    let key = format!("{field_name}=");
    let start = form_text
        .match_indices(&key)
        .map(|(index, _)| index)
        .find(|&index| index == 0 || form_text.as_bytes()[index - 1] == b'&');

    let Some(start) = start else {
        return form_text.to_string();
    };

    let end = form_text[start..]
        .find('&')
        .map(|end| start + end)
        .unwrap_or(form_text.len());

    format!("{}{key}********{}", &form_text[..start], &form_text[end..])
}

async fn body_to_string(body: Body) -> String {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::error!("Could not read body for logging: {error}");
            String::new()
        }
    }
}

fn log_body(prefix: &str, head: &impl std::fmt::Debug, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let mut cut = LOG_BODY_LENGTH_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        tracing::info!("{prefix}: {head:#?}\nbody: {}...", &body[..cut]);
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{prefix}: {head:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::redact_field;

    #[test]
    fn redacts_code_in_middle_of_form() {
        let got = redact_field("email=a%40b.com&code=123456&remember_me=on", "code");

        assert_eq!(got, "email=a%40b.com&code=********&remember_me=on");
    }

    #[test]
    fn redacts_code_at_end_of_form() {
        let got = redact_field("email=a%40b.com&code=123456", "code");

        assert_eq!(got, "email=a%40b.com&code=********");
    }

    #[test]
    fn ignores_fields_with_matching_suffix() {
        let got = redact_field("zipcode=12345", "code");

        assert_eq!(got, "zipcode=12345");
    }

    #[test]
    fn leaves_form_without_field_alone() {
        let got = redact_field("email=a%40b.com", "code");

        assert_eq!(got, "email=a%40b.com");
    }
}
