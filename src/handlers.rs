use crate::errors::AppError;
use crate::forms;
use crate::models::{Client, ClientInput, Invoice, NewInvoiceRequest, StatusUpdate};
use crate::state::AppState;
use crate::ui;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

/// Stats and recent clients are fetched concurrently and the page renders
/// only when both succeed; one combined error otherwise.
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let (stats, clients) = tokio::join!(
        state.api.dashboard_stats(),
        state.api.list_clients(Some(10))
    );
    match (stats, clients) {
        (Ok(stats), Ok(clients)) => Html(ui::render_dashboard(&stats, &clients)),
        (stats, clients) => {
            let mut parts = Vec::new();
            if let Err(err) = &stats {
                parts.push(format!("Stats: {err}"));
            }
            if let Err(err) = &clients {
                parts.push(format!("Clients: {err}"));
            }
            Html(ui::render_error_page(
                "/dashboard",
                "Failed to fetch dashboard data.",
                &parts.join(" "),
            ))
        }
    }
}

pub async fn clients_page(State(state): State<AppState>) -> Html<String> {
    match state.api.list_clients(None).await {
        Ok(clients) => Html(ui::render_clients(&clients)),
        Err(err) => Html(ui::render_error_page(
            "/clients",
            "Failed to fetch clients.",
            &err.to_string(),
        )),
    }
}

pub async fn invoices_page(State(state): State<AppState>) -> Html<String> {
    match state.api.list_invoices().await {
        Ok(invoices) => Html(ui::render_invoices(&invoices)),
        Err(err) => Html(ui::render_error_page(
            "/invoices",
            "Failed to fetch invoices.",
            &err.to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct NewInvoiceQuery {
    pub client_id: Option<i64>,
}

pub async fn new_invoice_page(
    State(state): State<AppState>,
    Query(query): Query<NewInvoiceQuery>,
) -> Html<String> {
    match state.api.list_clients(None).await {
        Ok(clients) => Html(ui::render_new_invoice(&clients, query.client_id)),
        Err(err) => Html(ui::render_error_page(
            "/invoices/new",
            "Could not load clients.",
            &err.to_string(),
        )),
    }
}

/// A non-numeric id renders the error view without touching the API.
pub async fn invoice_detail_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Html<String> {
    let Ok(id) = id.parse::<i64>() else {
        return Html(ui::render_error_page(
            "/invoices",
            "Error Loading Invoice",
            "Invoice ID is missing or invalid.",
        ));
    };
    match state.api.get_invoice(id).await {
        Ok(invoice) => Html(ui::render_invoice_detail(&invoice)),
        Err(err) => Html(ui::render_error_page(
            "/invoices",
            "Error Loading Invoice",
            &err.to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct PdfQuery {
    pub number: Option<String>,
}

pub async fn invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PdfQuery>,
) -> Result<Response, AppError> {
    let id = id
        .parse::<i64>()
        .map_err(|_| AppError::validation("Invoice ID is missing or invalid."))?;
    let pdf = state.api.invoice_pdf(id, query.number.as_deref()).await?;
    let disposition = format!("attachment; filename=\"{}\"", pdf.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf.bytes,
    )
        .into_response())
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let input = forms::validate_client(&input).map_err(AppError::validation)?;
    let client = state.api.create_client(&input).await?;
    info!(id = client.id, "created client");
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>, AppError> {
    let input = forms::validate_client(&input).map_err(AppError::validation)?;
    Ok(Json(state.api.update_client(id, &input).await?))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.api.delete_client(id).await?;
    info!(id, "deleted client");
    Ok(StatusCode::NO_CONTENT)
}

/// Runs the pre-flight validation before anything is sent upstream; a
/// rejected form never becomes a network request.
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<NewInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let payload = forms::validate_new_invoice(&request).map_err(AppError::validation)?;
    let invoice = state.api.create_invoice(&payload).await?;
    info!(id = invoice.id, "created invoice");
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn update_invoice_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Invoice>, AppError> {
    if update.status.trim().is_empty() {
        return Err(AppError::validation("New status not provided."));
    }
    Ok(Json(
        state.api.update_invoice_status(id, update.status.trim()).await?,
    ))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.api.delete_invoice(id).await?;
    info!(id, "deleted invoice");
    Ok(StatusCode::NO_CONTENT)
}
