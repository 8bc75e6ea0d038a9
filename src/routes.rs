use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    templates,
};

pub async fn movies(State(state): State<AppState>) -> AppResult<Html<String>> {
    let movies = state.catalog.movies().await?;
    let agg = state.catalog.aggregates().await?;
    Ok(Html(templates::movies_page(&movies, &agg, movies.len())))
}

pub async fn movie(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let detail = state.catalog.movie_by_slug(&slug).await?.ok_or(AppError::NotFound)?;
    Ok(Html(templates::movie_page(&detail)))
}

pub async fn directors(State(state): State<AppState>) -> AppResult<Html<String>> {
    Ok(Html(templates::directors_page(&state.catalog.directors().await?)))
}

/// Non-numeric ids are treated like unknown ones.
pub async fn director(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Html<String>> {
    let Ok(Path(id)) = id else {
        return Err(AppError::NotFound);
    };
    let detail = state.catalog.director_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Html(templates::director_page(&detail)))
}

pub async fn actors(State(state): State<AppState>) -> AppResult<Html<String>> {
    Ok(Html(templates::actors_page(&state.catalog.actors().await?)))
}

pub async fn actor(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Html<String>> {
    let Ok(Path(id)) = id else {
        return Err(AppError::NotFound);
    };
    let detail = state.catalog.actor_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Html(templates::actor_page(&detail)))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(templates::not_found_page()))
}
