//! In-process stand-ins for the parsing API used by tests.

use axum::{extract::Multipart, http::StatusCode, Json, Router};
use serde_json::{json, Value};

/// Serves `app` on an ephemeral local port and returns its `/api` base URL.
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Answers like a successful parse, echoing the `file` part's name as the full
/// name and its byte length as the phone number.
pub async fn echo_parse_handler(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let Ok(bytes) = field.bytes().await else {
            break;
        };
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "method": "regex",
                "data": {
                    "personalInfo": {"fullName": name, "email": "jane@x.com", "phone": bytes.len().to_string()},
                    "education": [{"degree": "BS", "institution": "MIT", "year": "2020"}],
                    "experience": [],
                    "skills": ["Go", "SQL"]
                }
            })),
        );
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "No file uploaded"})),
    )
}
