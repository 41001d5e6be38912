use serde::Deserialize;

/// Request body for creating a post. There is no update payload: posts are
/// edited by delete and reinsert.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub user_id: i64,
}
