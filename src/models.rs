use serde::{Deserialize, Serialize};

/// Entity shapes as the invoice API returns them. This layer never owns
/// them; every mutation goes through the API and the server's response is
/// taken as the new truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: i64,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub client_id: i64,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub issue_date: String,
    pub due_date: String,
    pub status: String,
    pub total_amount: f64,
    #[serde(default)]
    pub service_items: Vec<ServiceItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub yearly_revenue: f64,
    pub total_outstanding: f64,
    pub total_clients: i64,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

/// Body for client create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A draft line item as the new-invoice form posts it. Row keys used for
/// rendering stay in the page; only these three fields travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItemInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

/// The new-invoice form submission, before validation. Everything defaults
/// so an incomplete submission reaches our validation instead of a decode
/// rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoiceRequest {
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub issue_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub service_items: Vec<ServiceItemInput>,
}

/// The validated payload sent upstream.
#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoice {
    pub client_id: i64,
    pub invoice_number: String,
    pub issue_date: String,
    pub due_date: String,
    pub service_items: Vec<ServiceItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}
