use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, categories, items, profiles, requests, tags, transactions, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(profiles::router())
        .merge(categories::router())
        .merge(tags::router())
        .merge(items::router())
        .merge(requests::router())
        .merge(transactions::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn send(method: Method, uri: &str, bearer: Option<&str>) -> axum::response::Response {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        build_app(AppState::fake())
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let res = send(Method::GET, "/health", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn protected_routes_require_a_bearer_token() {
        for (method, uri) in [
            (Method::GET, "/users/me"),
            (Method::GET, "/users"),
            (Method::GET, "/profiles/me"),
            (Method::GET, "/items/my-items"),
            (Method::GET, "/requests"),
            (Method::GET, "/requests/my-requests"),
            (Method::DELETE, "/requests/1"),
            (Method::GET, "/transactions/customer"),
            (Method::PUT, "/transactions/1/cancel"),
        ] {
            let res = send(method.clone(), uri, None).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(res.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        }
    }

    #[tokio::test]
    async fn garbage_and_foreign_tokens_are_rejected() {
        let foreign = crate::auth::jwt::JwtKeys::from(&crate::config::JwtConfig {
            secret: "someone-else".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
        .sign_access(1)
        .unwrap();

        for token in ["not-a-jwt", foreign.as_str()] {
            let res = send(Method::GET, "/users/me", Some(token)).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn refresh_token_cannot_authenticate_requests() {
        let state = AppState::fake();
        let keys = crate::auth::jwt::JwtKeys::from(&state.config.jwt);
        let refresh = keys.sign_refresh(1).unwrap();
        let res = send(Method::GET, "/requests/my-requests", Some(&refresh)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let res = send(Method::GET, "/nope", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
