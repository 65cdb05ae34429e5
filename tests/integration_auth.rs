mod common;

use axum::http::{StatusCode, header};
use chrono::Utc;
use everato_auth::{Claims, TokenSigner};
use everato_config::ServerConfig;
use serde_json::json;
use tower::ServiceExt;

use common::{
    TEST_PASSWORD, TOKEN_LIFETIME_SECS, body_json, get, get_with_bearer, get_with_cookie,
    post_json, set_cookie, signer, test_app, test_app_with, token_for, token_with, user_fixture,
};

#[tokio::test]
async fn test_login_sets_session_cookie_and_returns_token() {
    let app = test_app();
    let user = user_fixture();
    app.store.insert_user(user.clone());

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": user.email, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains(&format!("Max-Age={}", TOKEN_LIFETIME_SECS)));

    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap();
    assert!(cookie.starts_with(&format!("jwt={};", token)));
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], user.email);
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert!(body["user"].get("password").is_none());

    let claims = signer().verify(token).unwrap();
    assert_eq!(claims.uid().unwrap(), user.id.to_string());
    assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECS);
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
    let app = test_app();
    let user = user_fixture();
    app.store.insert_user(user.clone());

    let unknown = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "nobody@everato.test", "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    let wrong = app
        .router
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": user.email, "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(unknown.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

#[tokio::test]
async fn test_login_invalid_email_format() {
    let app = test_app();

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_on_public_path_ignores_bad_token() {
    let app = test_app();
    let user = user_fixture();
    app.store.insert_user(user.clone());

    let mut request = post_json(
        "/api/v1/auth/login",
        json!({ "email": user.email, "password": TEST_PASSWORD }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer definitely.not.valid".parse().unwrap(),
    );

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = test_app();

    let response = app.router.oneshot(get("/api/v1/auth/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["reason"], "no_token");
    assert_eq!(body["error"], "Token not found or malformed");
}

#[tokio::test]
async fn test_me_with_cookie_and_bearer() {
    let app = test_app();
    let user = user_fixture();
    app.store.insert_user(user.clone());
    let token = token_for(user.id);

    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/api/v1/auth/me", &format!("jwt={}", token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["uid"], user.id.to_string());
    assert_eq!(body["user"]["email"], user.email);

    let response = app
        .router
        .oneshot(get_with_bearer("/api/v1/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = test_app();
    let now = Utc::now().timestamp();
    let token = token_with(Claims {
        sub: String::new(),
        aud: String::new(),
        iss: "everato".to_string(),
        iat: now - 120,
        exp: now - 60,
        uid: Some("42".to_string()),
    });

    let response = app
        .router
        .oneshot(get_with_bearer("/api/v1/auth/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["reason"], "expired");
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let app = test_app();
    let (token, _) = TokenSigner::new("some-other-secret", "everato", 3600)
        .issue("42", "mallory")
        .unwrap();

    let response = app
        .router
        .oneshot(get_with_bearer("/api/v1/auth/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["reason"], "invalid_signature");
}

#[tokio::test]
async fn test_token_without_uid_is_rejected() {
    let app = test_app();
    let mut claims = Claims::for_login("42", "someone", "everato", 3600);
    claims.uid = None;

    let response = app
        .router
        .oneshot(get_with_bearer("/api/v1/auth/me", &token_with(claims)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["reason"], "missing_claim");
    assert_eq!(body["error"], "Token missing UID");
}

#[tokio::test]
async fn test_refresh_issues_new_cookie() {
    let app = test_app();
    let user = user_fixture();
    app.store.insert_user(user.clone());

    let mut request = get_with_bearer("/api/v1/auth/refresh", &token_for(user.id));
    *request.method_mut() = axum::http::Method::POST;

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with("jwt="));

    let body = body_json(response).await;
    let claims = signer().verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.uid().unwrap(), user.id.to_string());
    assert_eq!(body["exp"], claims.exp);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = test_app();

    let response = app
        .router
        .oneshot(post_json("/api/v1/auth/logout", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("jwt=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_rejection_redirects_to_served_login_route() {
    let app = test_app_with(ServerConfig {
        redirect_on_reject: true,
        ..Default::default()
    });
    let user = user_fixture();
    app.store.insert_user(user.clone());

    let response = app
        .router
        .clone()
        .oneshot(get("/api/v1/auth/me"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(location, "/api/v1/auth/login");

    let response = app
        .router
        .oneshot(post_json(
            &location,
            json!({ "email": user.email, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_redirect_follows_custom_prefix() {
    let app = test_app_with(ServerConfig {
        redirect_on_reject: true,
        api_prefix: "/api/v2".to_string(),
        ..Default::default()
    });

    let response = app.router.oneshot(get("/api/v2/auth/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/v2/auth/login"
    );
}

#[tokio::test]
async fn test_register_validates_before_touching_database() {
    let app = test_app();

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/auth/register",
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "not-an-email",
                "password": "short",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();

    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_custom_api_prefix() {
    let app = test_app_with(ServerConfig {
        api_prefix: "/api/v2".to_string(),
        ..Default::default()
    });
    let user = user_fixture();
    app.store.insert_user(user.clone());

    let response = app
        .router
        .oneshot(post_json(
            "/api/v2/auth/login",
            json!({ "email": user.email, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();

    let response = app
        .router
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"].get("/api/v1/auth/login").is_some());
    assert!(body["paths"].get("/api/v1/auth/register").is_some());
}
