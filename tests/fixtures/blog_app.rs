use axum::extract::{Json, Path, Query};

pub struct PostController;
pub struct CommentController;

pub struct StorePostRequest;
pub struct StoreCommentRequest;
pub struct ListPosts;

impl PostController {
    /// List posts.
    ///
    /// Posts are returned newest first. Drafts are only
    /// visible to their author.
    pub fn index(&self, query: Query<ListPosts>) -> Json<Vec<Post>> {
        todo!()
    }

    /// Create a post.
    /// The post starts out as a draft.
    pub fn store(&self, user: &User, request: Json<StorePostRequest>) -> Json<Post> {
        todo!()
    }

    pub fn show(&self, Path(id): Path<u64>) -> Json<Post> {
        todo!()
    }
}

impl CommentController {
    /// Add a comment to a post
    /// as the acting user.
    pub fn store(&self, Path(post): Path<u64>, request: Json<StoreCommentRequest>) -> Json<Comment> {
        todo!()
    }
}

/// Health check
pub fn health() -> &'static str {
    "ok"
}
