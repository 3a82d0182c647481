use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Comment, Post, User};
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- posts ---

#[tokio::test]
async fn list_posts_empty() {
    let resp = app().oneshot(get("/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn create_post_returns_201_and_echoes_extra_fields() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/posts",
            r#"{"title":"Hello","content":"World","tags":["rust"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.title, "Hello");
    assert_eq!(post.extra["tags"][0], "rust");
}

#[tokio::test]
async fn create_post_missing_title_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"content":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_post_not_found_has_message() {
    let resp = app().oneshot(get("/posts/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn get_post_bad_id_returns_400() {
    let resp = app().oneshot(get("/posts/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_without_query_returns_422() {
    let resp = app().oneshot(get("/posts/search")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "The query field is required.");
}

// --- comments ---

#[tokio::test]
async fn add_comment_without_session_returns_401() {
    let resp = app()
        .oneshot(json_request("POST", "/posts/1/comments", r#"{"content":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Unauthenticated.");
}

#[tokio::test]
async fn edit_comment_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/comments/9", r#"{"content":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- auth ---

#[tokio::test]
async fn register_blank_email_returns_422() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/register",
            r#"{"name":"Ada","email":"  ","password":"pw"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "The email field is required.");
}

#[tokio::test]
async fn login_unknown_user_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"email":"nobody@example.com","password":"pw"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- full lifecycle ---

#[tokio::test]
async fn blog_lifecycle() {
    let mut app = app().into_service();

    // register, then register again with the same email
    let registration = r#"{"name":"Ada","email":"ada@example.com","password":"secret"}"#;
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/register", registration))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    let user: User = serde_json::from_value(body["user"].clone()).unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/register", registration))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // login sets the session cookie
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/login",
            r#"{"email":"ada@example.com","password":"secret"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .headers()
        .get(http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));

    // create a post as the logged-in user
    let mut create = json_request("POST", "/posts", r#"{"title":"Rust tips","content":"Borrow"}"#);
    create
        .headers_mut()
        .insert(http::header::COOKIE, cookie.parse().unwrap());
    let resp = ServiceExt::ready(&mut app).await.unwrap().call(create).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.user_id, Some(user.id));
    let id = post.id;

    // search, recent, per-user listing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/posts/search?query=RUST"))
        .await
        .unwrap();
    let found: Vec<Post> = body_json(resp).await;
    assert_eq!(found, vec![post.clone()]);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/posts/recent"))
        .await
        .unwrap();
    let recent: Vec<Post> = body_json(resp).await;
    assert_eq!(recent.len(), 1);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/users/{}/posts", user.id)))
        .await
        .unwrap();
    let mine: Vec<Post> = body_json(resp).await;
    assert_eq!(mine[0].id, id);

    // comment with the session cookie, edit, then list
    let mut add = json_request("POST", &format!("/posts/{id}/comments"), r#"{"content":"Nice"}"#);
    add.headers_mut()
        .insert(http::header::COOKIE, cookie.parse().unwrap());
    let resp = ServiceExt::ready(&mut app).await.unwrap().call(add).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Comment = body_json(resp).await;
    assert_eq!(comment.post_id, id);
    assert_eq!(comment.user_id, Some(user.id));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/comments/{}", comment.id),
            r#"{"content":"Very nice"}"#,
        ))
        .await
        .unwrap();
    let edited: Comment = body_json(resp).await;
    assert_eq!(edited.content, "Very nice");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/posts/{id}/comments")))
        .await
        .unwrap();
    let comments: Vec<Comment> = body_json(resp).await;
    assert_eq!(comments, vec![edited]);

    // delete the post; its comments go with it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/posts/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &format!("/comments/{}", comment.id), r#"{"content":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete the user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/users/{}", user.id))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/users"))
        .await
        .unwrap();
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());
}
