use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/dashboard", get(handlers::dashboard))
        .route("/clients", get(handlers::clients_page))
        .route("/invoices", get(handlers::invoices_page))
        .route("/invoices/new", get(handlers::new_invoice_page))
        .route("/invoices/:id", get(handlers::invoice_detail_page))
        .route("/invoices/:id/pdf", get(handlers::invoice_pdf))
        .route("/api/clients", post(handlers::create_client))
        .route(
            "/api/clients/:id",
            put(handlers::update_client).delete(handlers::delete_client),
        )
        .route("/api/invoices", post(handlers::create_invoice))
        .route("/api/invoices/:id", delete(handlers::delete_invoice))
        .route("/api/invoices/:id/status", patch(handlers::update_invoice_status))
        .with_state(state)
}
