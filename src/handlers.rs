// handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use http::{header, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    chart,
    error::AppError,
    export,
    poll::{sort_by_votes, winners},
    state::{AppState, DbConn},
    views,
};

#[derive(Debug, Deserialize)]
pub struct PollQuery {
    #[serde(rename = "pollID")]
    pub poll_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteQuery {
    #[serde(rename = "pollID")]
    pub poll_id: Option<String>,
    #[serde(rename = "optionID")]
    pub option_id: Option<String>,
}

/// Identifiers must be present and non-negative.
fn parse_id(name: &str, raw: Option<&str>) -> Result<i64, AppError> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|id| *id >= 0)
        .ok_or_else(|| {
            warn!("Rejected {name}={raw:?}");
            AppError::invalid_param(name)
        })
}

/// List every poll
pub async fn list_polls(
    State(state): State<Arc<AppState>>,
    DbConn(mut conn): DbConn,
) -> Result<Html<String>, AppError> {
    let polls = state.dao.list_polls(&mut conn).await?;
    Ok(Html(views::index(&polls)))
}

/// Show a poll's options, each linking to the vote endpoint
pub async fn ballot(
    Query(query): Query<PollQuery>,
    State(state): State<Arc<AppState>>,
    DbConn(mut conn): DbConn,
) -> Result<Html<String>, AppError> {
    let poll_id = parse_id("pollID", query.poll_id.as_deref())?;

    let poll = state
        .dao
        .get_poll(&mut conn, poll_id)
        .await?
        .ok_or_else(|| AppError::invalid_param("pollID"))?;

    let mut options = state
        .dao
        .get_poll_options_by_poll(&mut conn, poll_id)
        .await?
        .unwrap_or_default();
    sort_by_votes(&mut options);

    Ok(Html(views::ballot(&poll, &options)))
}

/// Count one vote, then send the voter to the results
pub async fn vote(
    Query(query): Query<VoteQuery>,
    State(state): State<Arc<AppState>>,
    DbConn(mut conn): DbConn,
) -> Result<Response, AppError> {
    let poll_id = parse_id("pollID", query.poll_id.as_deref())?;
    let option_id = parse_id("optionID", query.option_id.as_deref())?;

    if state.dao.add_vote(&mut conn, option_id).await? == 0 {
        warn!(poll_id, option_id, "Vote for unknown option");
        return Err(AppError::invalid_param("optionID"));
    }
    info!(poll_id, option_id, "Vote recorded");

    let location = format!("/results?pollID={poll_id}");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Results table with the winning options
pub async fn results(
    Query(query): Query<PollQuery>,
    State(state): State<Arc<AppState>>,
    DbConn(mut conn): DbConn,
) -> Result<Html<String>, AppError> {
    let poll_id = parse_id("pollID", query.poll_id.as_deref())?;

    let poll = state.dao.get_poll(&mut conn, poll_id).await?;
    let options = state.dao.get_poll_options_by_poll(&mut conn, poll_id).await?;
    let (Some(poll), Some(mut options)) = (poll, options) else {
        return Err(AppError::invalid_param("pollID"));
    };

    sort_by_votes(&mut options);
    let winners = winners(&options);

    Ok(Html(views::results(&poll, &options, &winners)))
}

/// Pie chart of the vote distribution, wedges in results-table order
pub async fn chart(
    Query(query): Query<PollQuery>,
    State(state): State<Arc<AppState>>,
    DbConn(mut conn): DbConn,
) -> Result<Response, AppError> {
    let poll_id = parse_id("pollID", query.poll_id.as_deref())?;

    let mut options = state
        .dao
        .get_poll_options_by_poll(&mut conn, poll_id)
        .await?
        .ok_or_else(|| AppError::invalid_param("pollID"))?;

    sort_by_votes(&mut options);
    let png = chart::render_pie_png(&options)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Results as a downloadable spreadsheet
pub async fn export(
    Query(query): Query<PollQuery>,
    State(state): State<Arc<AppState>>,
    DbConn(mut conn): DbConn,
) -> Result<Response, AppError> {
    let poll_id = parse_id("pollID", query.poll_id.as_deref())?;

    let options = state
        .dao
        .get_poll_options_by_poll(&mut conn, poll_id)
        .await?
        .ok_or_else(|| AppError::invalid_param("pollID"))?;

    let xlsx = export::render_xlsx(&export::result_rows(options))?;
    let disposition = format!("attachment; filename={}", export::export_filename(poll_id));

    Ok((
        [
            (header::CONTENT_TYPE, export::XLSX_CONTENT_TYPE.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        xlsx,
    )
        .into_response())
}
