//! Salary vote handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::AppJson;
use crate::AppState;
use payscope_common::{
    auth::UserContext,
    errors::Result,
    services::{VoteTally, VoteType},
};

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: VoteType,
}

#[derive(Debug, Serialize)]
pub struct CurrentVoteResponse {
    pub user_vote: Option<VoteType>,
}

/// Cast, switch or withdraw the caller's vote
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(salary_id): Path<Uuid>,
    user: UserContext,
    AppJson(request): AppJson<VoteRequest>,
) -> Result<Json<VoteTally>> {
    let tally = state
        .votes
        .vote(salary_id, user.user_id, request.vote_type)
        .await?;
    Ok(Json(tally))
}

pub async fn get_vote(
    State(state): State<AppState>,
    Path(salary_id): Path<Uuid>,
    user: UserContext,
) -> Result<Json<CurrentVoteResponse>> {
    let user_vote = state.votes.current_vote(salary_id, user.user_id).await?;
    Ok(Json(CurrentVoteResponse { user_vote }))
}
