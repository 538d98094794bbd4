use uuid::Uuid;

use crate::comment::NodePath;
use crate::error::ApiError;

pub fn parse_lesson_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request("Invalid lesson id"))
}

pub fn parse_comment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request("Invalid comment id"))
}

/// Route segments in order: comment id, then zero to three reply ids
pub fn node_path(segments: &[String]) -> Result<NodePath, ApiError> {
    let (comment, replies) = segments
        .split_first()
        .ok_or_else(|| ApiError::bad_request("Invalid comment id"))?;
    let comment_id = parse_comment_id(comment)?;
    let replies: Vec<&str> = replies.iter().map(String::as_str).collect();
    Ok(NodePath::parse(comment_id, &replies)?)
}

/// Lenient numeric query parameter: anything unparsable counts as absent
pub fn parse_number(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
}
