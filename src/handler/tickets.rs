// src/handler/tickets.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dtos::ticketdtos::{CloseTicketDto, CreateTicketDto, TicketListQueryDto},
    error::HttpError,
    middleware::{self, extract_token},
    AppState,
};

pub fn ticket_handler() -> Router {
    let public_routes = Router::new()
        .route("/", post(create_ticket))
        .route(
            "/number/:ticket_number/secret-key/:secret_key",
            get(get_ticket_by_number),
        );

    let staff_routes = Router::new()
        .route("/", get(list_tickets))
        .route("/id/:id", get(get_ticket_by_id))
        .route("/view/:id", put(view_ticket))
        .route("/close/:id", put(close_ticket))
        .layer(axum::middleware::from_fn(middleware::is_helper))
        .layer(axum::middleware::from_fn(middleware::auth));

    public_routes.merge(staff_routes)
}

pub async fn list_tickets(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<TicketListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let unfiltered =
        query.filter.as_deref() == Some("none") && query.param.as_deref() == Some("none");

    let page = if unfiltered {
        app_state
            .ticket_service
            .get_all(query.limit, query.page)
            .await?
    } else {
        app_state
            .ticket_service
            .get_by_filter(
                query.filter.as_deref(),
                query.param.as_deref(),
                query.limit,
                query.page,
            )
            .await?
    };

    Ok(Json(page))
}

pub async fn get_ticket_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let ticket = app_state.ticket_service.get_by_id(&id).await?;

    Ok(Json(ticket))
}

pub async fn get_ticket_by_number(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((ticket_number, secret_key)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpError> {
    let ticket = app_state
        .ticket_service
        .get_by_number(&ticket_number, &secret_key)
        .await?;

    Ok(Json(ticket))
}

pub async fn create_ticket(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Option<Json<CreateTicketDto>>,
) -> Result<impl IntoResponse, HttpError> {
    let created = app_state
        .ticket_service
        .create(body.map(|Json(body)| body))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn view_ticket(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, &headers);
    let updated = app_state
        .ticket_service
        .mark_viewed(&id, token.as_deref())
        .await?;

    Ok(Json(updated))
}

pub async fn close_ticket(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<CloseTicketDto>>,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, &headers);
    let summary = body.and_then(|Json(body)| body.summary);
    let updated = app_state
        .ticket_service
        .mark_closed(&id, summary.as_deref(), token.as_deref())
        .await?;

    Ok(Json(updated))
}
