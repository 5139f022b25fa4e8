use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use invoice_admin::models::{
    Client, ClientInput, DashboardStats, Invoice, MonthlyRevenue, ServiceItem, ServiceItemInput,
    StatusUpdate,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::sleep;

static TEST_LOCK: Lazy<AsyncMutex<()>> = Lazy::new(|| AsyncMutex::new(()));

/// In-memory stand-in for the invoice backend, with request counters so
/// tests can assert which calls never left this layer.
#[derive(Default)]
struct Upstream {
    clients: Mutex<Vec<Client>>,
    invoices: Mutex<Vec<Invoice>>,
    next_id: AtomicI64,
    client_posts: AtomicUsize,
    invoice_posts: AtomicUsize,
    invoice_gets: AtomicUsize,
    fail_stats: AtomicBool,
}

impl Upstream {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn seed_client(&self, name: &str, email: &str) -> Client {
        let client = Client {
            id: self.next_id(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.clients.lock().unwrap().push(client.clone());
        client
    }

    fn seed_invoice(
        &self,
        client: &Client,
        number: Option<&str>,
        status: &str,
        items: &[(&str, f64, f64)],
    ) -> Invoice {
        let id = self.next_id();
        let service_items: Vec<ServiceItem> = items
            .iter()
            .map(|(description, quantity, unit_price)| ServiceItem {
                id: self.next_id(),
                description: description.to_string(),
                quantity: *quantity,
                unit_price: *unit_price,
                subtotal: quantity * unit_price,
            })
            .collect();
        let invoice = Invoice {
            id,
            client_id: client.id,
            client_name: Some(client.name.clone()),
            client_email: Some(client.email.clone()),
            invoice_number: number.map(str::to_string),
            issue_date: "2026-01-10".to_string(),
            due_date: "2026-02-10".to_string(),
            status: status.to_string(),
            total_amount: service_items.iter().map(|i| i.subtotal).sum(),
            service_items,
            notes: None,
            payment_terms: None,
        };
        self.invoices.lock().unwrap().push(invoice.clone());
        invoice
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn upstream_list_clients(
    State(upstream): State<Arc<Upstream>>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<Client>> {
    let mut clients = upstream.clients.lock().unwrap().clone();
    if let Some(limit) = query.limit {
        clients.truncate(limit);
    }
    Json(clients)
}

async fn upstream_create_client(
    State(upstream): State<Arc<Upstream>>,
    Json(input): Json<ClientInput>,
) -> Response {
    upstream.client_posts.fetch_add(1, Ordering::SeqCst);
    if input.name.is_empty() || input.email.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Missing name or email");
    }
    let duplicate = upstream
        .clients
        .lock()
        .unwrap()
        .iter()
        .any(|c| c.email == input.email);
    if duplicate {
        return error_body(StatusCode::BAD_REQUEST, "Email already exists");
    }
    let client = upstream.seed_client(&input.name, &input.email);
    (StatusCode::CREATED, Json(client)).into_response()
}

async fn upstream_update_client(
    State(upstream): State<Arc<Upstream>>,
    Path(id): Path<i64>,
    Json(input): Json<ClientInput>,
) -> Response {
    let mut clients = upstream.clients.lock().unwrap();
    match clients.iter_mut().find(|c| c.id == id) {
        Some(client) => {
            client.name = input.name;
            client.email = input.email;
            Json(client.clone()).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, "Client not found"),
    }
}

async fn upstream_delete_client(
    State(upstream): State<Arc<Upstream>>,
    Path(id): Path<i64>,
) -> Response {
    let mut clients = upstream.clients.lock().unwrap();
    let before = clients.len();
    clients.retain(|c| c.id != id);
    if clients.len() == before {
        return error_body(StatusCode::NOT_FOUND, "Client not found");
    }
    Json(serde_json::json!({ "message": "Client deleted successfully" })).into_response()
}

#[derive(Debug, Deserialize)]
struct CreateInvoiceBody {
    client_id: i64,
    #[serde(default)]
    invoice_number: String,
    issue_date: String,
    due_date: String,
    service_items: Vec<ServiceItemInput>,
}

async fn upstream_list_invoices(State(upstream): State<Arc<Upstream>>) -> Json<Vec<Invoice>> {
    Json(upstream.invoices.lock().unwrap().clone())
}

async fn upstream_create_invoice(
    State(upstream): State<Arc<Upstream>>,
    Json(body): Json<CreateInvoiceBody>,
) -> Response {
    upstream.invoice_posts.fetch_add(1, Ordering::SeqCst);
    let client = upstream
        .clients
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.id == body.client_id)
        .cloned();
    let Some(client) = client else {
        return error_body(StatusCode::NOT_FOUND, "Client not found");
    };
    if !body.invoice_number.is_empty() {
        let duplicate = upstream
            .invoices
            .lock()
            .unwrap()
            .iter()
            .any(|i| i.invoice_number.as_deref() == Some(body.invoice_number.as_str()));
        if duplicate {
            return error_body(StatusCode::BAD_REQUEST, "Invoice number already exists");
        }
    }
    let items: Vec<(&str, f64, f64)> = body
        .service_items
        .iter()
        .map(|i| (i.description.as_str(), i.quantity, i.unit_price))
        .collect();
    let number = if body.invoice_number.is_empty() {
        None
    } else {
        Some(body.invoice_number.as_str())
    };
    let mut invoice = upstream.seed_invoice(&client, number, "draft", &items);
    invoice.issue_date = body.issue_date;
    invoice.due_date = body.due_date;
    (StatusCode::CREATED, Json(invoice)).into_response()
}

async fn upstream_get_invoice(
    State(upstream): State<Arc<Upstream>>,
    Path(id): Path<i64>,
) -> Response {
    upstream.invoice_gets.fetch_add(1, Ordering::SeqCst);
    let invoice = upstream
        .invoices
        .lock()
        .unwrap()
        .iter()
        .find(|i| i.id == id)
        .cloned();
    match invoice {
        Some(invoice) => Json(invoice).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Invoice not found"),
    }
}

async fn upstream_delete_invoice(
    State(upstream): State<Arc<Upstream>>,
    Path(id): Path<i64>,
) -> Response {
    let mut invoices = upstream.invoices.lock().unwrap();
    let before = invoices.len();
    invoices.retain(|i| i.id != id);
    if invoices.len() == before {
        return error_body(StatusCode::NOT_FOUND, "Invoice not found");
    }
    Json(serde_json::json!({ "message": "Invoice deleted successfully" })).into_response()
}

async fn upstream_update_status(
    State(upstream): State<Arc<Upstream>>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    if !["paid", "unpaid", "overdue"].contains(&update.status.as_str()) {
        return error_body(
            StatusCode::BAD_REQUEST,
            &format!("Invalid status: {}", update.status),
        );
    }
    let mut invoices = upstream.invoices.lock().unwrap();
    match invoices.iter_mut().find(|i| i.id == id) {
        Some(invoice) => {
            invoice.status = update.status;
            Json(invoice.clone()).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, "Invoice not found"),
    }
}

async fn upstream_invoice_pdf(
    State(upstream): State<Arc<Upstream>>,
    Path(id): Path<i64>,
) -> Response {
    let invoice = upstream
        .invoices
        .lock()
        .unwrap()
        .iter()
        .find(|i| i.id == id)
        .cloned();
    let Some(invoice) = invoice else {
        return error_body(StatusCode::NOT_FOUND, "Invoice not found");
    };
    let body = b"%PDF-1.4 stub".to_vec();
    match invoice.invoice_number.filter(|n| !n.is_empty()) {
        Some(number) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=upstream_{number}.pdf"),
                ),
            ],
            body,
        )
            .into_response(),
        None => (
            [(header::CONTENT_TYPE, "application/pdf".to_string())],
            body,
        )
            .into_response(),
    }
}

async fn upstream_dashboard_stats(State(upstream): State<Arc<Upstream>>) -> Response {
    if upstream.fail_stats.load(Ordering::SeqCst) {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "stats unavailable");
    }
    let stats = DashboardStats {
        yearly_revenue: 12_500.0,
        total_outstanding: 900.0,
        total_clients: upstream.clients.lock().unwrap().len() as i64,
        monthly_revenue: vec![
            MonthlyRevenue {
                name: "Jan".to_string(),
                total: 4_000.0,
            },
            MonthlyRevenue {
                name: "Feb".to_string(),
                total: 8_500.0,
            },
        ],
    };
    Json(stats).into_response()
}

fn upstream_router(upstream: Arc<Upstream>) -> Router {
    Router::new()
        .route(
            "/api/clients",
            get(upstream_list_clients).post(upstream_create_client),
        )
        .route(
            "/api/clients/:id",
            axum::routing::put(upstream_update_client).delete(upstream_delete_client),
        )
        .route(
            "/api/invoices",
            get(upstream_list_invoices).post(upstream_create_invoice),
        )
        .route(
            "/api/invoices/:id",
            get(upstream_get_invoice).delete(upstream_delete_invoice),
        )
        .route(
            "/api/invoices/:id/status",
            axum::routing::patch(upstream_update_status),
        )
        .route("/api/invoices/:id/pdf", get(upstream_invoice_pdf))
        .route("/api/dashboard-stats", get(upstream_dashboard_stats))
        .with_state(upstream)
}

struct TestContext {
    app_url: String,
    upstream: Arc<Upstream>,
    child: Child,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = reqwest::Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/dashboard")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn start() -> TestContext {
    let upstream = Arc::new(Upstream::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let upstream_addr = listener.local_addr().unwrap();
    let router = upstream_router(Arc::clone(&upstream));
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream serve");
    });

    let app_port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_invoice-admin"))
        .env("PORT", app_port.to_string())
        .env(
            "INVOICE_API_BASE_URL",
            format!("http://{upstream_addr}/api"),
        )
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let app_url = format!("http://127.0.0.1:{app_port}");
    wait_until_ready(&app_url).await;

    TestContext {
        app_url,
        upstream,
        child,
    }
}

#[tokio::test]
async fn create_client_via_proxy_appears_in_list() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{}/api/clients", ctx.app_url))
        .json(&serde_json::json!({ "name": "Acme Corp", "email": "billing@acme.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: Client = res.json().await.unwrap();
    assert_eq!(created.name, "Acme Corp");

    let page = http
        .get(format!("{}/clients", ctx.app_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Acme Corp"));
    assert!(page.contains("billing@acme.test"));
}

#[tokio::test]
async fn blank_client_input_is_rejected_without_upstream_call() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{}/api/clients", ctx.app_url))
        .json(&serde_json::json!({ "name": " ", "email": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Name and email are required.");
    assert_eq!(ctx.upstream.client_posts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_invoice_form_never_reaches_upstream() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();

    // No client selected.
    let res = http
        .post(format!("{}/api/invoices", ctx.app_url))
        .json(&serde_json::json!({
            "issue_date": "2026-01-10",
            "due_date": "2026-02-10",
            "service_items": [{ "description": "Design", "quantity": 1, "unit_price": 50 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "Client, Issue Date, and Due Date are required."
    );

    // All line items blank.
    let res = http
        .post(format!("{}/api/invoices", ctx.app_url))
        .json(&serde_json::json!({
            "client_id": 1,
            "issue_date": "2026-01-10",
            "due_date": "2026-02-10",
            "service_items": [
                { "description": "", "quantity": 1, "unit_price": 0 },
                { "description": "   ", "quantity": 2, "unit_price": 10 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "At least one line item with a description is required."
    );

    assert_eq!(ctx.upstream.invoice_posts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invoice_create_strips_blank_rows() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();
    let client = ctx.upstream.seed_client("Globex", "g@globex.test");

    let res = http
        .post(format!("{}/api/invoices", ctx.app_url))
        .json(&serde_json::json!({
            "client_id": client.id,
            "invoice_number": "INV-100",
            "issue_date": "2026-03-01",
            "due_date": "2026-04-01",
            "service_items": [
                { "description": "Consulting", "quantity": 3, "unit_price": 200 },
                { "description": "", "quantity": 1, "unit_price": 0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let invoice: Invoice = res.json().await.unwrap();
    assert_eq!(invoice.service_items.len(), 1);
    assert_eq!(invoice.total_amount, 600.0);
    assert_eq!(invoice.invoice_number.as_deref(), Some("INV-100"));
    assert_eq!(ctx.upstream.invoice_posts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn duplicate_invoice_number_error_is_surfaced_verbatim() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();
    let client = ctx.upstream.seed_client("Initech", "i@initech.test");
    ctx.upstream
        .seed_invoice(&client, Some("INV-7"), "unpaid", &[("Work", 1.0, 100.0)]);

    let res = http
        .post(format!("{}/api/invoices", ctx.app_url))
        .json(&serde_json::json!({
            "client_id": client.id,
            "invoice_number": "INV-7",
            "issue_date": "2026-03-01",
            "due_date": "2026-04-01",
            "service_items": [{ "description": "More work", "quantity": 1, "unit_price": 10 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Invoice number already exists");
}

#[tokio::test]
async fn status_update_replaces_invoice_state() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();
    let client = ctx.upstream.seed_client("Hooli", "h@hooli.test");
    let invoice = ctx
        .upstream
        .seed_invoice(&client, Some("INV-8"), "unpaid", &[("Audit", 2.0, 150.0)]);

    let res = http
        .patch(format!("{}/api/invoices/{}/status", ctx.app_url, invoice.id))
        .json(&serde_json::json!({ "status": "paid" }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let updated: Invoice = res.json().await.unwrap();
    assert_eq!(updated.status, "paid");

    // Transitions the backend rejects come back as its own message.
    let res = http
        .patch(format!("{}/api/invoices/{}/status", ctx.app_url, invoice.id))
        .json(&serde_json::json!({ "status": "draft" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Invalid status: draft");
}

#[tokio::test]
async fn delete_invoice_failure_keeps_message_success_removes() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();
    let client = ctx.upstream.seed_client("Umbrella", "u@umbrella.test");
    let invoice = ctx
        .upstream
        .seed_invoice(&client, Some("INV-9"), "unpaid", &[("Cleanup", 1.0, 75.0)]);

    let res = http
        .delete(format!("{}/api/invoices/99999", ctx.app_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Invoice not found");
    assert_eq!(ctx.upstream.invoices.lock().unwrap().len(), 1);

    let res = http
        .delete(format!("{}/api/invoices/{}", ctx.app_url, invoice.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(ctx.upstream.invoices.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pdf_filename_comes_from_disposition_or_fallback() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();
    let client = ctx.upstream.seed_client("Stark", "s@stark.test");
    let with_number = ctx
        .upstream
        .seed_invoice(&client, Some("INV-55"), "paid", &[("Suit", 1.0, 1000.0)]);
    let without_number = ctx
        .upstream
        .seed_invoice(&client, None, "paid", &[("Repairs", 1.0, 500.0)]);

    // Upstream header wins.
    let res = http
        .get(format!("{}/invoices/{}/pdf", ctx.app_url, with_number.id))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert_eq!(
        res.headers()[reqwest::header::CONTENT_TYPE],
        "application/pdf"
    );
    let disposition = res.headers()[reqwest::header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("upstream_INV-55.pdf"), "{disposition}");
    assert!(!res.bytes().await.unwrap().is_empty());

    // No upstream header: fall back to the invoice number passed by the page.
    let res = http
        .get(format!(
            "{}/invoices/{}/pdf?number=INV-77",
            ctx.app_url, without_number.id
        ))
        .send()
        .await
        .unwrap();
    let disposition = res.headers()[reqwest::header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("invoice_INV-77.pdf"), "{disposition}");

    // No header and no number: fall back to the id.
    let res = http
        .get(format!("{}/invoices/{}/pdf", ctx.app_url, without_number.id))
        .send()
        .await
        .unwrap();
    let disposition = res.headers()[reqwest::header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(
        disposition.contains(&format!("invoice_{}.pdf", without_number.id)),
        "{disposition}"
    );
}

#[tokio::test]
async fn dashboard_errors_when_either_fetch_fails() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();
    ctx.upstream.seed_client("Wayne", "w@wayne.test");

    let page = http
        .get(format!("{}/dashboard", ctx.app_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Yearly Revenue"));
    assert!(page.contains("Wayne"));

    ctx.upstream.fail_stats.store(true, Ordering::SeqCst);
    let page = http
        .get(format!("{}/dashboard", ctx.app_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Failed to fetch dashboard data."));
    assert!(page.contains("Stats: stats unavailable"));
    assert!(!page.contains("Yearly Revenue"));
}

#[tokio::test]
async fn invalid_invoice_id_short_circuits_detail_page() {
    let _guard = TEST_LOCK.lock().await;
    let ctx = start().await;
    let http = reqwest::Client::new();

    let page = http
        .get(format!("{}/invoices/not-a-number", ctx.app_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Invoice ID is missing or invalid."));
    assert_eq!(ctx.upstream.invoice_gets.load(Ordering::SeqCst), 0);
}
