//! Comment thread handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extract::AppJson;
use crate::AppState;
use payscope_common::{
    auth::{OptionalUser, UserContext},
    errors::Result,
    services::{CommentPage, CommentSort, CommentView, NewCommentInput, VoteTally},
};

use super::votes::VoteRequest;

#[derive(Debug, Default, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(default)]
    pub sort: CommentSort,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(salary_id): Path<Uuid>,
    OptionalUser(viewer): OptionalUser,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<CommentPage>> {
    let per_page = state.config.comments_per_page(query.per_page);
    let page = state
        .comments
        .list_comments(
            salary_id,
            query.sort,
            query.page.unwrap_or(1),
            per_page,
            viewer.map(|u| u.user_id),
        )
        .await?;
    Ok(Json(page))
}

/// Post a comment; anonymous callers get a generated handle
pub async fn create_comment(
    State(state): State<AppState>,
    Path(salary_id): Path<Uuid>,
    OptionalUser(author): OptionalUser,
    AppJson(input): AppJson<NewCommentInput>,
) -> Result<(StatusCode, Json<CommentView>)> {
    let comment = state
        .comments
        .add_comment(salary_id, author.as_ref(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn vote_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    user: UserContext,
    AppJson(request): AppJson<VoteRequest>,
) -> Result<Json<VoteTally>> {
    let tally = state
        .comments
        .vote_on_comment(comment_id, user.user_id, request.vote_type)
        .await?;
    Ok(Json(tally))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    user: UserContext,
) -> Result<StatusCode> {
    state.comments.delete_comment(comment_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
