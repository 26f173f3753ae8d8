//! Community forum endpoints under `/api/forums`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brightpath_api::{ApiError, Page, PageParams};
use brightpath_core::model::{Category, Comment, Post, Reply, UserSummary};
use brightpath_core::time_since;

use crate::extract::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/my-posts", get(list_my_posts))
        .route("/posts/category/{category_id}", get(list_posts_in_category))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route(
            "/posts/{post_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/comments/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route(
            "/comments/{comment_id}/replies",
            get(list_replies).post(create_reply),
        )
        .route(
            "/replies/{id}",
            get(get_reply).put(update_reply).delete(delete_reply),
        )
}

async fn author_summary(state: &AppState, id: Uuid) -> Result<Option<UserSummary>, ApiError> {
    Ok(state.store.get_user(id).await?.map(|u| u.summary()))
}

// -------------------------
// Categories
// -------------------------

#[derive(Debug, Deserialize)]
struct CategoryPayload {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_categories().await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .store
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let category = Category::new(body.name, body.description);
    let created = state.store.create_category(&category).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut category = state
        .store
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    category.name = body.name;
    category.description = body.description;
    category.touch();
    Ok(Json(state.store.update_category(&category).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    state.store.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------
// Posts
// -------------------------

#[derive(Debug, Serialize)]
struct PostView {
    #[serde(flatten)]
    post: Post,
    author: Option<UserSummary>,
    time_since_posted: String,
}

impl PostView {
    async fn load(state: &AppState, post: Post) -> Result<Self, ApiError> {
        let author = author_summary(state, post.author_id).await?;
        let time_since_posted = time_since(post.created_at);
        Ok(Self {
            post,
            author,
            time_since_posted,
        })
    }
}

async fn post_views(state: &AppState, posts: Vec<Post>) -> Result<Vec<PostView>, ApiError> {
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        views.push(PostView::load(state, post).await?);
    }
    Ok(views)
}

#[derive(Debug, Deserialize)]
struct PostPayload {
    category_id: Uuid,
    title: String,
    details: String,
}

async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.store.list_posts(None).await?;
    Ok(Json(Page::from_vec(post_views(&state, posts).await?, &page)))
}

async fn list_my_posts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let posts: Vec<Post> = state
        .store
        .list_posts(None)
        .await?
        .into_iter()
        .filter(|p| p.author_id == user.id)
        .collect();
    Ok(Json(Page::from_vec(post_views(&state, posts).await?, &page)))
}

async fn list_posts_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_category(category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    let posts = state.store.list_posts(Some(category_id)).await?;
    Ok(Json(Page::from_vec(post_views(&state, posts).await?, &page)))
}

async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<PostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    state
        .store
        .get_category(body.category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    let post = Post::new(user.id, body.category_id, body.title, body.details);
    let created = state.store.create_post(&post).await?;
    Ok((StatusCode::CREATED, Json(PostView::load(&state, created).await?)))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    let mut comments = Vec::new();
    for comment in state.store.list_comments(post.id).await? {
        let replies = state.store.list_replies(comment.id).await?;
        let mut reply_views = Vec::with_capacity(replies.len());
        for reply in replies {
            reply_views.push(ReplyView::load(&state, reply).await?);
        }
        let author = author_summary(&state, comment.author_id).await?;
        let time_since_commented = time_since(comment.created_at);
        comments.push(CommentDetail {
            comment,
            author,
            time_since_commented,
            replies: reply_views,
        });
    }
    let view = PostView::load(&state, post).await?;
    Ok(Json(PostDetail { view, comments }))
}

#[derive(Debug, Serialize)]
struct PostDetail {
    #[serde(flatten)]
    view: PostView,
    comments: Vec<CommentDetail>,
}

#[derive(Debug, Serialize)]
struct CommentDetail {
    #[serde(flatten)]
    comment: Comment,
    author: Option<UserSummary>,
    time_since_commented: String,
    replies: Vec<ReplyView>,
}

#[derive(Debug, Deserialize)]
struct PostUpdatePayload {
    title: String,
    details: String,
}

async fn update_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PostUpdatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    if post.author_id != user.id {
        return Err(ApiError::forbidden("Only the author can edit this post"));
    }
    post.title = body.title;
    post.details = body.details;
    post.touch();
    let updated = state.store.update_post(&post).await?;
    Ok(Json(PostView::load(&state, updated).await?))
}

async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    if post.author_id != user.id {
        return Err(ApiError::forbidden("Only the author can delete this post"));
    }
    state.store.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------
// Comments
// -------------------------

#[derive(Debug, Serialize)]
struct CommentView {
    #[serde(flatten)]
    comment: Comment,
    author: Option<UserSummary>,
    time_since_commented: String,
}

impl CommentView {
    async fn load(state: &AppState, comment: Comment) -> Result<Self, ApiError> {
        let author = author_summary(state, comment.author_id).await?;
        let time_since_commented = time_since(comment.created_at);
        Ok(Self {
            comment,
            author,
            time_since_commented,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    content: String,
}

async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    let mut views = Vec::new();
    for comment in state.store.list_comments(post_id).await? {
        views.push(CommentView::load(&state, comment).await?);
    }
    Ok(Json(views))
}

async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }
    state
        .store
        .get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    let comment = Comment::new(post_id, user.id, body.content);
    let created = state.store.create_comment(&comment).await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentView::load(&state, created).await?),
    ))
}

async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    Ok(Json(CommentView::load(&state, comment).await?))
}

async fn update_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut comment = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    if comment.author_id != user.id {
        return Err(ApiError::forbidden("Only the author can edit this comment"));
    }
    comment.content = body.content;
    comment.touch();
    let updated = state.store.update_comment(&comment).await?;
    Ok(Json(CommentView::load(&state, updated).await?))
}

async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    if comment.author_id != user.id {
        return Err(ApiError::forbidden(
            "Only the author can delete this comment",
        ));
    }
    state.store.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------
// Replies
// -------------------------

#[derive(Debug, Serialize)]
struct ReplyView {
    #[serde(flatten)]
    reply: Reply,
    author: Option<UserSummary>,
    time_since_replied: String,
}

impl ReplyView {
    async fn load(state: &AppState, reply: Reply) -> Result<Self, ApiError> {
        let author = author_summary(state, reply.author_id).await?;
        let time_since_replied = time_since(reply.created_at);
        Ok(Self {
            reply,
            author,
            time_since_replied,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReplyPayload {
    content: String,
}

async fn list_replies(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    let mut views = Vec::new();
    for reply in state.store.list_replies(comment_id).await? {
        views.push(ReplyView::load(&state, reply).await?);
    }
    Ok(Json(views))
}

async fn create_reply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<ReplyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }
    state
        .store
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    let reply = Reply::new(comment_id, user.id, body.content);
    let created = state.store.create_reply(&reply).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReplyView::load(&state, created).await?),
    ))
}

async fn get_reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state
        .store
        .get_reply(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reply not found"))?;
    Ok(Json(ReplyView::load(&state, reply).await?))
}

async fn update_reply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ReplyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut reply = state
        .store
        .get_reply(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reply not found"))?;
    if reply.author_id != user.id {
        return Err(ApiError::forbidden("Only the author can edit this reply"));
    }
    reply.content = body.content;
    reply.touch();
    let updated = state.store.update_reply(&reply).await?;
    Ok(Json(ReplyView::load(&state, updated).await?))
}

async fn delete_reply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state
        .store
        .get_reply(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reply not found"))?;
    if reply.author_id != user.id {
        return Err(ApiError::forbidden("Only the author can delete this reply"));
    }
    state.store.delete_reply(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
