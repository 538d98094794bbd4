#![allow(dead_code)]

use anyhow::{Context, Result};
use lifecherry_api::auth::{generate_jwt, Claims};
use lifecherry_api::config::AppConfig;
use lifecherry_api::database::models::{LessonSummary, UserProfile};
use lifecherry_api::database::MemoryStore;
use lifecherry_api::{app, AppState};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";
pub const LESSON_CREATOR: &str = "creator@lifecherry.test";
pub const READER: &str = "reader@lifecherry.test";
pub const OTHER: &str = "other@lifecherry.test";
pub const ADMIN: &str = "admin@lifecherry.test";
pub const PREMIUM: &str = "premium@lifecherry.test";

/// An in-process server on an ephemeral port, backed by a fresh memory store
pub struct TestServer {
    pub base_url: String,
    pub lesson_id: Uuid,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.api.enable_request_logging = false;

        let store = MemoryStore::new();
        let lesson_id = Uuid::new_v4();
        store
            .add_lesson(LessonSummary {
                id: lesson_id,
                title: "Slow mornings".to_string(),
                creator_email: LESSON_CREATOR.to_string(),
            })
            .await;
        store.add_user(UserProfile::new(READER, "Reader").with_photo("https://img.test/reader.png")).await;
        store.add_user(UserProfile::new(OTHER, "Other")).await;
        store.add_user(UserProfile::new(ADMIN, "Admin").admin()).await;
        store.add_user(UserProfile::new(PREMIUM, "Premium").premium()).await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        let router = app(AppState::with_memory(config, store));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            lesson_id,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn as_user(&self, builder: RequestBuilder, email: &str) -> RequestBuilder {
        builder.bearer_auth(token(email))
    }

    /// POST /api/lessons/:id/comments as `email`
    pub async fn create_comment(&self, email: &str, content: &str) -> Result<Value> {
        let res = self
            .as_user(self.client.post(self.url(&self.comments_path())), email)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        expect_status(res, StatusCode::CREATED).await
    }

    /// POST `<node>/replies` as `email`, returning the new reply id
    pub async fn add_reply(&self, email: &str, node: &str, content: &str) -> Result<String> {
        let res = self
            .as_user(self.client.post(self.url(&format!("{}/replies", node))), email)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        let body = expect_status(res, StatusCode::CREATED).await?;
        body["data"]["replyId"]
            .as_str()
            .map(str::to_string)
            .context("missing replyId")
    }

    pub fn comments_path(&self) -> String {
        format!("/api/lessons/{}/comments", self.lesson_id)
    }
}

pub fn token(email: &str) -> String {
    let claims = Claims::new(email, None, 1);
    generate_jwt(&claims, SECRET).expect("test token")
}

/// Assert the status and return the JSON body
pub async fn expect_status(res: Response, expected: StatusCode) -> Result<Value> {
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    anyhow::ensure!(status == expected, "expected {}, got {}: {}", expected, status, body);
    Ok(body)
}
