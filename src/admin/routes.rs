use axum::{
    Form, Router,
    extract::{Path, Query, RawQuery, State},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    Level, Message, ModelAdmin,
    actions::{self, ACTION_FIELD, SELECTED_FIELD},
    auth,
    changelist::{self, ChangeListQuery},
    flash,
    forms::{self, FormData, FormErrors},
    records, templates,
};
use crate::{
    AppState,
    error::{AppError, AppResult},
};

type Pairs = Vec<(String, String)>;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/admin/", get(index))
        .route("/admin/{entity}/", get(changelist_view).post(changelist_post))
        .route("/admin/{entity}/add/", get(add_view).post(add_post))
        .route("/admin/{entity}/{id}/change/", get(change_view).post(change_post))
        .route("/admin/{entity}/{id}/delete/", get(delete_view).post(delete_post))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    Router::new()
        .route("/admin", get(|| async { Redirect::permanent("/admin/") }))
        .route(auth::LOGIN_PATH, get(auth::login_page).post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .merge(protected)
}

fn model_admin<'a>(state: &'a AppState, slug: &str) -> AppResult<&'a ModelAdmin> {
    state.admin.by_slug(slug).ok_or(AppError::NotFound)
}

fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse().map_err(|_| AppError::NotFound)
}

fn changelist_url(admin: &ModelAdmin) -> String {
    format!("/admin/{}/", admin.entity.slug())
}

fn counted(admin: &ModelAdmin, n: usize) -> &'static str {
    if n == 1 { admin.entity.verbose_name() } else { admin.entity.verbose_name_plural() }
}

async fn index(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, messages) = flash::take(jar);
    (jar, Html(templates::index_page(&state.admin, &messages)))
}

async fn changelist_view(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<Pairs>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let admin = model_admin(&state, &entity)?;
    let db = state.catalog.db();

    let records = records::load(db, admin.entity).await?;
    let query = ChangeListQuery::from_pairs(admin, &params);
    let cl = changelist::build(admin, records, query);
    let widgets = forms::inline_widgets(db, admin).await?;

    let (jar, messages) = flash::take(jar);
    Ok((jar, Html(templates::changelist_page(&cl, &widgets, &messages))))
}

/// Bulk action or, when `_save` is present, in-list edits.
async fn changelist_post(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    RawQuery(raw_query): RawQuery,
    jar: CookieJar,
    Form(pairs): Form<Pairs>,
) -> AppResult<(CookieJar, Redirect)> {
    let admin = model_admin(&state, &entity)?;
    let db = state.catalog.db();
    let data = FormData::new(pairs);

    let messages: Vec<Message> = if data.has("_save") {
        match forms::save_inline(db, admin, &data).await? {
            Ok(0) => Vec::new(),
            Ok(changed) => {
                tracing::info!(entity = admin.entity.slug(), changed, "inline edits saved");
                let verb = if changed == 1 { "was" } else { "were" };
                vec![Message::new(
                    Level::Success,
                    format!("{changed} {} {verb} changed successfully.", counted(admin, changed)),
                )]
            }
            Err(problems) => vec![inline_failure(&problems)],
        }
    } else {
        let ids: Vec<i32> =
            data.get_all(SELECTED_FIELD).into_iter().filter_map(|id| id.parse().ok()).collect();
        actions::run(db, admin, data.get(ACTION_FIELD), &ids).await?.into_iter().collect()
    };

    let back = match raw_query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{}?{query}", changelist_url(admin)),
        None => changelist_url(admin),
    };
    Ok((flash::push(jar, &messages), Redirect::to(&back)))
}

/// One notice for a rejected in-list save, however many cells failed.
fn inline_failure(problems: &[String]) -> Message {
    let first = problems.first().map(String::as_str).unwrap_or_default();
    let text = match problems.len() {
        0 | 1 => format!("Nothing was saved. {first}"),
        n => format!("Nothing was saved, {n} errors. {first} (and {} more)", n - 1),
    };
    Message::new(Level::Error, text)
}

async fn render_form(
    state: &AppState,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
    errors: &FormErrors,
    messages: &[Message],
) -> AppResult<Html<String>> {
    let fields = forms::fields(state.catalog.db(), admin, data, errors).await?;
    Ok(Html(templates::change_form_page(admin, id, &fields, messages)))
}

async fn add_view(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let admin = model_admin(&state, &entity)?;
    let (jar, messages) = flash::take(jar);
    let defaults = forms::defaults(admin.entity);
    let page = render_form(&state, admin, None, &defaults, &FormErrors::new(), &messages).await?;
    Ok((jar, page))
}

async fn change_view(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let admin = model_admin(&state, &entity)?;
    let id = parse_id(&id)?;
    let data =
        forms::initial(state.catalog.db(), admin.entity, id).await?.ok_or(AppError::NotFound)?;
    let (jar, messages) = flash::take(jar);
    let page = render_form(&state, admin, Some(id), &data, &FormErrors::new(), &messages).await?;
    Ok((jar, page))
}

async fn add_post(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    jar: CookieJar,
    Form(pairs): Form<Pairs>,
) -> AppResult<Response> {
    let admin = model_admin(&state, &entity)?;
    submit(&state, admin, None, FormData::new(pairs), jar).await
}

async fn change_post(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    jar: CookieJar,
    Form(pairs): Form<Pairs>,
) -> AppResult<Response> {
    let admin = model_admin(&state, &entity)?;
    let id = parse_id(&id)?;
    if forms::label_of(state.catalog.db(), admin.entity, id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    submit(&state, admin, Some(id), FormData::new(pairs), jar).await
}

async fn submit(
    state: &AppState,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: FormData,
    jar: CookieJar,
) -> AppResult<Response> {
    let saved = match forms::save(state.catalog.db(), admin, id, &data).await? {
        Ok(saved) => saved,
        Err(errors) => {
            tracing::debug!(entity = admin.entity.slug(), ?errors, "form rejected");
            return Ok(render_form(state, admin, id, &data, &errors, &[]).await?.into_response());
        }
    };

    let verb = if id.is_some() { "changed" } else { "added" };
    tracing::info!(entity = admin.entity.slug(), id = saved.id, verb, "record saved");

    let noun = admin.entity.verbose_name();
    let done = format!("The {noun} “{}” was {verb} successfully.", saved.label);
    let (location, text) = if data.has("_continue") {
        (
            format!("/admin/{}/{}/change/", admin.entity.slug(), saved.id),
            format!("{done} You may edit it again below."),
        )
    } else if data.has("_addanother") {
        (
            format!("{}add/", changelist_url(admin)),
            format!("{done} You may add another {noun} below."),
        )
    } else {
        (changelist_url(admin), done)
    };

    let jar = flash::push(jar, &[Message::new(Level::Success, text)]);
    Ok((jar, Redirect::to(&location)).into_response())
}

async fn delete_view(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Html<String>> {
    let admin = model_admin(&state, &entity)?;
    let id = parse_id(&id)?;
    let label =
        forms::label_of(state.catalog.db(), admin.entity, id).await?.ok_or(AppError::NotFound)?;
    Ok(Html(templates::delete_page(admin, id, &label)))
}

async fn delete_post(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    let admin = model_admin(&state, &entity)?;
    let id = parse_id(&id)?;
    let db = state.catalog.db();
    let label = forms::label_of(db, admin.entity, id).await?.ok_or(AppError::NotFound)?;

    forms::delete(db, admin.entity, id).await?;
    tracing::info!(entity = admin.entity.slug(), id, "record deleted");

    let noun = admin.entity.verbose_name();
    let text = format!("The {noun} “{label}” was deleted successfully.");
    let jar = flash::push(jar, &[Message::new(Level::Success, text)]);
    Ok((jar, Redirect::to(&changelist_url(admin))))
}
