mod support;

use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use charsheet::localization::t;
use charsheet::server::create_router;
use support::test_context;
use tower::ServiceExt;

fn webhook_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const START_UPDATE: &str = r#"{
    "update_id": 10000,
    "message": {
        "message_id": 1365,
        "date": 1700000000,
        "chat": {"id": 482913, "type": "private", "first_name": "Lyra", "username": "lyra"},
        "from": {"id": 482913, "is_bot": false, "first_name": "Lyra", "username": "lyra"},
        "text": "/start",
        "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() -> Result<()> {
        let (ctx, _transport, _store) = test_context(vec![]).await?;
        let response = create_router(ctx)
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"OK");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() -> Result<()> {
        let (ctx, transport, _store) = test_context(vec![]).await?;
        let response = create_router(ctx).oneshot(webhook_request("not json")).await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(transport.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_is_accepted_and_handled() -> Result<()> {
        let (ctx, transport, _store) = test_context(vec![]).await?;
        let response = create_router(ctx).oneshot(webhook_request(START_UPDATE)).await?;
        assert_eq!(response.status(), StatusCode::OK);

        // Handling runs on a spawned task
        for _ in 0..100 {
            if !transport.sent().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(transport.messages(), vec![t("start-greeting")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route() -> Result<()> {
        let (ctx, _transport, _store) = test_context(vec![]).await?;
        let response = create_router(ctx)
            .oneshot(Request::builder().uri("/nope").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
