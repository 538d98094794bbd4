mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{expect_status, TestServer, OTHER, READER};

#[tokio::test]
async fn create_comment_snapshots_author() -> Result<()> {
    let server = TestServer::spawn().await?;

    let body = server.create_comment(READER, "  Great read!  ").await?;
    let comment = &body["data"];
    assert_eq!(body["success"], true);
    assert_eq!(comment["content"], "Great read!");
    assert_eq!(comment["author"]["email"], READER);
    assert_eq!(comment["author"]["displayName"], "Reader");
    assert_eq!(comment["author"]["photoUrl"], "https://img.test/reader.png");
    assert_eq!(comment["replies"], json!([]));
    assert_eq!(comment["reactions"], json!([]));

    Ok(())
}

#[tokio::test]
async fn create_comment_validation() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .as_user(server.client.post(server.url(&server.comments_path())), READER)
        .json(&json!({ "content": "   " }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["message"], "Comment content is required");

    let res = server
        .as_user(server.client.post(server.url(&server.comments_path())), READER)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["code"], "INVALID_JSON");

    let missing = format!("/api/lessons/{}/comments", uuid::Uuid::new_v4());
    let res = server
        .as_user(server.client.post(server.url(&missing)), READER)
        .json(&json!({ "content": "hello" }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(body["message"], "Lesson not found");

    Ok(())
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let body = server.create_comment(READER, "first draft").await?;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/api/comments/{}", id);

    let res = server
        .as_user(server.client.patch(server.url(&path)), OTHER)
        .json(&json!({ "content": "defaced" }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::FORBIDDEN).await?;
    assert_eq!(body["message"], "Can only edit your own comments");

    let res = server
        .as_user(server.client.patch(server.url(&path)), READER)
        .json(&json!({ "content": "final draft" }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["content"], "final draft");

    let res = server.as_user(server.client.delete(server.url(&path)), common::ADMIN).send().await?;
    expect_status(res, StatusCode::FORBIDDEN).await?;

    let res = server.as_user(server.client.delete(server.url(&path)), READER).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["message"], "Comment deleted");

    let res = server.as_user(server.client.delete(server.url(&path)), READER).send().await?;
    let body = expect_status(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(body["message"], "Comment not found");

    let res = server
        .as_user(server.client.delete(server.url("/api/comments/garbage")), READER)
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["message"], "Invalid comment id");

    Ok(())
}
