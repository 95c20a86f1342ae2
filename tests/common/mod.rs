#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use flashcard_quiz::{config::HttpConfig, create_router, grader::Embedder, AppState, Grader, MemoryStore};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Deterministic stand-in for the sentence model: lowercase bag of words hashed into 128 buckets.
pub struct WordBagEmbedder;

impl Embedder for WordBagEmbedder {
    fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 128];
                for word in text.split_whitespace() {
                    let mut hasher = DefaultHasher::new();
                    word.to_lowercase().hash(&mut hasher);
                    vector[(hasher.finish() % 128) as usize] += 1.0;
                }
                vector
            })
            .collect())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body should be UTF-8")
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> TestApp {
        let state = AppState::new(Arc::new(MemoryStore::new()), Grader::new(Arc::new(WordBagEmbedder)));
        TestApp {
            router: create_router(state, &HttpConfig::default()),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.expect("router should respond");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

        TestResponse { status, headers, body }
    }

    /// Signs up and logs in, returning the `Cookie` header value for the session.
    pub async fn login_as(&self, username: &str) -> String {
        let credentials = serde_json::json!({ "username": username, "password": "hunter2" });

        let signup = self.request(Method::POST, "/signup", None, Some(credentials.clone())).await;
        assert_eq!(signup.status, StatusCode::CREATED);

        let login = self.request(Method::POST, "/login", None, Some(credentials)).await;
        assert_eq!(login.status, StatusCode::OK);

        let set_cookie = login.set_cookie().expect("login should set a cookie");
        set_cookie.split(';').next().unwrap().to_string()
    }

    pub async fn create_subject(&self, cookie: &str, name: &str) -> i64 {
        let response = self
            .request(Method::POST, "/subjects", Some(cookie), Some(serde_json::json!({ "name": name })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"].as_i64().unwrap()
    }

    pub async fn add_flashcard(&self, cookie: &str, subject_id: i64, card: &str, definition: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                &format!("/subjects/{}/flashcards", subject_id),
                Some(cookie),
                Some(serde_json::json!({ "card": card, "definition": definition })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"].as_i64().unwrap()
    }
}
