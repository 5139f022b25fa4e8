use crate::models::{Client, DashboardStats, Invoice, MonthlyRevenue};
use chrono::NaiveDate;

const MAX_VISIBLE_SEGMENTS: usize = 3;

pub fn render_dashboard(stats: &DashboardStats, recent_clients: &[Client]) -> String {
    let mut client_rows = String::new();
    for client in recent_clients {
        client_rows.push_str(&format!(
            r#"<li class="client-row"><div><span class="client-name">{name}</span><span class="client-email">{email}</span></div><a class="btn ghost" href="/invoices/new?client_id={id}">+ Invoice</a></li>"#,
            name = escape(&client.name),
            email = escape(&client.email),
            id = client.id,
        ));
    }
    if client_rows.is_empty() {
        client_rows.push_str(r#"<li class="empty">No clients yet.</li>"#);
    }

    let content = DASHBOARD_HTML
        .replace("{{YEARLY_REVENUE}}", &escape(&format_usd(stats.yearly_revenue)))
        .replace(
            "{{TOTAL_OUTSTANDING}}",
            &escape(&format_usd(stats.total_outstanding)),
        )
        .replace("{{TOTAL_CLIENTS}}", &stats.total_clients.to_string())
        .replace("{{CHART}}", &bar_chart_svg(&stats.monthly_revenue))
        .replace("{{CLIENT_ROWS}}", &client_rows);

    render_page("/dashboard", "Dashboard", &content)
}

pub fn render_clients(clients: &[Client]) -> String {
    let mut rows = String::new();
    for client in clients {
        rows.push_str(&format!(
            r#"<tr><td>{name}</td><td>{email}</td><td class="actions"><button class="btn ghost edit-client" data-id="{id}" data-name="{name}" data-email="{email}">Edit</button><button class="btn danger delete-client" data-id="{id}" data-label="{name}">Delete</button></td></tr>"#,
            id = client.id,
            name = escape(&client.name),
            email = escape(&client.email),
        ));
    }
    if rows.is_empty() {
        rows.push_str(r#"<tr><td colspan="3" class="empty">No clients found. Add one to get started.</td></tr>"#);
    }

    render_page("/clients", "Clients", &CLIENTS_HTML.replace("{{ROWS}}", &rows))
}

pub fn render_invoices(invoices: &[Invoice]) -> String {
    let mut rows = String::new();
    for invoice in invoices {
        let number = invoice
            .invoice_number
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(escape)
            .unwrap_or_else(|| format!("#{}", invoice.id));
        rows.push_str(&format!(
            r#"<tr><td><a href="/invoices/{id}">{number}</a></td><td>{client}</td><td>{issued}</td><td>{due}</td><td><span class="{badge}">{status}</span></td><td class="amount">{total}</td><td class="actions"><a class="btn ghost" href="/invoices/{id}">View</a><button class="btn danger delete-invoice" data-id="{id}" data-label="{number}">Delete</button></td></tr>"#,
            id = invoice.id,
            number = number,
            client = escape(invoice.client_name.as_deref().unwrap_or("—")),
            issued = escape(&format_long_date(&invoice.issue_date)),
            due = escape(&format_long_date(&invoice.due_date)),
            badge = status_class(&invoice.status),
            status = escape(&capitalize(&invoice.status)),
            total = escape(&format_usd(invoice.total_amount)),
        ));
    }
    if rows.is_empty() {
        rows.push_str(r#"<tr><td colspan="7" class="empty">No invoices found. Create your first one.</td></tr>"#);
    }

    render_page("/invoices", "Invoices", &INVOICES_HTML.replace("{{ROWS}}", &rows))
}

pub fn render_invoice_detail(invoice: &Invoice) -> String {
    let number = invoice
        .invoice_number
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", invoice.id));

    let mut item_rows = String::new();
    for item in &invoice.service_items {
        item_rows.push_str(&format!(
            r#"<tr><td>{description}</td><td class="amount">{quantity}</td><td class="amount">{unit}</td><td class="amount">{subtotal}</td></tr>"#,
            description = escape(&item.description),
            quantity = item.quantity,
            unit = escape(&format_usd(item.unit_price)),
            subtotal = escape(&format_usd(item.subtotal)),
        ));
    }
    if item_rows.is_empty() {
        item_rows.push_str(r#"<tr><td colspan="4" class="empty">No line items.</td></tr>"#);
    }

    // Only the transitions the API accepts, minus the current status.
    let mut status_buttons = String::new();
    for status in ["paid", "unpaid", "overdue"] {
        if !invoice.status.eq_ignore_ascii_case(status) {
            status_buttons.push_str(&format!(
                r#"<button class="btn ghost status-btn" data-status="{status}">Mark as {label}</button>"#,
                label = capitalize(status),
            ));
        }
    }

    let mut extras = String::new();
    if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        extras.push_str(&format!(
            r#"<div class="extra"><h3>Notes</h3><p>{}</p></div>"#,
            escape(notes)
        ));
    }
    if let Some(terms) = invoice
        .payment_terms
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        extras.push_str(&format!(
            r#"<div class="extra"><h3>Payment Terms</h3><p>{}</p></div>"#,
            escape(terms)
        ));
    }

    let content = INVOICE_DETAIL_HTML
        .replace("{{ID}}", &invoice.id.to_string())
        .replace("{{NUMBER_ATTR}}", &escape(invoice.invoice_number.as_deref().unwrap_or("")))
        .replace("{{NUMBER}}", &escape(&number))
        .replace("{{CLIENT_NAME}}", &escape(invoice.client_name.as_deref().unwrap_or("—")))
        .replace("{{CLIENT_EMAIL}}", &escape(invoice.client_email.as_deref().unwrap_or("")))
        .replace("{{ISSUE_DATE}}", &escape(&format_long_date(&invoice.issue_date)))
        .replace("{{DUE_DATE}}", &escape(&format_long_date(&invoice.due_date)))
        .replace("{{STATUS_CLASS}}", status_class(&invoice.status))
        .replace("{{STATUS}}", &escape(&capitalize(&invoice.status)))
        .replace("{{ITEM_ROWS}}", &item_rows)
        .replace("{{TOTAL}}", &escape(&format_usd(invoice.total_amount)))
        .replace("{{STATUS_BUTTONS}}", &status_buttons)
        .replace("{{EXTRAS}}", &extras);

    render_page(
        &format!("/invoices/{}", invoice.id),
        &format!("Invoice {number}"),
        &content,
    )
}

pub fn render_new_invoice(clients: &[Client], preselected: Option<i64>) -> String {
    let mut options = String::from(r#"<option value="">Select a client</option>"#);
    for client in clients {
        let selected = if preselected == Some(client.id) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{id}"{selected}>{name}</option>"#,
            id = client.id,
            name = escape(&client.name),
        ));
    }

    render_page(
        "/invoices/new",
        "Create New Invoice",
        &NEW_INVOICE_HTML.replace("{{CLIENT_OPTIONS}}", &options),
    )
}

pub fn render_error_page(path: &str, title: &str, message: &str) -> String {
    let content = ERROR_HTML
        .replace("{{ERROR_TITLE}}", &escape(title))
        .replace("{{ERROR_MESSAGE}}", &escape(message));
    render_page(path, title, &content)
}

fn render_page(path: &str, title: &str, content: &str) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{ACTIVE_DASHBOARD}}", active_class(path, "/dashboard"))
        .replace("{{ACTIVE_CLIENTS}}", active_class(path, "/clients"))
        .replace("{{ACTIVE_INVOICES}}", active_class(path, "/invoices"))
        .replace("{{BREADCRUMB}}", &render_breadcrumb(path))
        .replace("{{CONTENT}}", content)
}

fn active_class(path: &str, prefix: &str) -> &'static str {
    let matches = if prefix == "/dashboard" {
        path == "/dashboard"
    } else {
        path == prefix || path.starts_with(&format!("{prefix}/"))
    };
    if matches { "active" } else { "" }
}

/// Path segments shown in the header. Long paths collapse to the first
/// segment, an ellipsis, and the last two.
pub fn breadcrumb_items(path: &str) -> Vec<(String, Option<String>)> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let item = |idx: usize| {
        let label = capitalize(segments[idx]);
        if idx == segments.len() - 1 {
            (label, None)
        } else {
            (label, Some(format!("/{}", segments[..=idx].join("/"))))
        }
    };

    if segments.len() <= MAX_VISIBLE_SEGMENTS {
        return (0..segments.len()).map(item).collect();
    }

    let mut items = vec![item(0), ("…".to_string(), None)];
    items.extend((segments.len() - 2..segments.len()).map(item));
    items
}

fn render_breadcrumb(path: &str) -> String {
    let mut html = String::new();
    for (label, href) in breadcrumb_items(path) {
        html.push_str(r#"<span class="sep">/</span>"#);
        match href {
            Some(href) => html.push_str(&format!(
                r#"<a href="{}">{}</a>"#,
                escape(&href),
                escape(&label)
            )),
            None => html.push_str(&format!(r#"<span class="current">{}</span>"#, escape(&label))),
        }
    }
    html
}

fn bar_chart_svg(months: &[MonthlyRevenue]) -> String {
    const WIDTH: f64 = 640.0;
    const HEIGHT: f64 = 240.0;
    const PAD_X: f64 = 48.0;
    const PAD_TOP: f64 = 16.0;
    const PAD_BOTTOM: f64 = 28.0;

    if months.is_empty() {
        return r#"<svg viewBox="0 0 640 240" role="img" aria-label="Monthly revenue"><text class="chart-label" x="50%" y="50%" text-anchor="middle">No revenue data yet</text></svg>"#.to_string();
    }

    let max = months
        .iter()
        .map(|m| m.total)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let slot = (WIDTH - PAD_X * 2.0) / months.len() as f64;
    let bar_width = slot * 0.6;

    let mut body = format!(
        r#"<text class="chart-label" x="{x:.1}" y="{top:.1}" text-anchor="end">{max_label}</text><text class="chart-label" x="{x:.1}" y="{bottom:.1}" text-anchor="end">$0</text>"#,
        x = PAD_X - 8.0,
        top = PAD_TOP + 10.0,
        bottom = HEIGHT - PAD_BOTTOM,
        max_label = escape(&format_usd_short(max)),
    );

    for (i, month) in months.iter().enumerate() {
        let height = (month.total / max) * (HEIGHT - PAD_TOP - PAD_BOTTOM);
        let x = PAD_X + i as f64 * slot + (slot - bar_width) / 2.0;
        let y = HEIGHT - PAD_BOTTOM - height;
        body.push_str(&format!(
            r#"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" rx="4"><title>{title}</title></rect>"#,
            title = escape(&format_usd(month.total)),
        ));
        body.push_str(&format!(
            r#"<text class="chart-label" x="{x:.1}" y="{y:.1}" text-anchor="middle">{label}</text>"#,
            x = x + bar_width / 2.0,
            y = HEIGHT - 8.0,
            label = escape(&month.name),
        ));
    }

    format!(r#"<svg viewBox="0 0 640 240" role="img" aria-label="Monthly revenue">{body}</svg>"#)
}

pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u128;
    let dollars = (cents / 100).to_string();
    let fraction = cents % 100;
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${grouped}.{fraction:02}", if negative { "-" } else { "" })
}

fn format_usd_short(amount: f64) -> String {
    let abs = amount.abs();
    if abs >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.1}K", amount / 1_000.0)
    } else {
        format!("${amount:.0}")
    }
}

/// `YYYY-MM-DD` to "Month D, YYYY"; anything unparsable passes through.
pub fn format_long_date(value: &str) -> String {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

pub fn status_class(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "paid" => "badge paid",
        "sent" => "badge sent",
        "unpaid" => "badge unpaid",
        "overdue" => "badge overdue",
        _ => "badge draft",
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Invoice Admin</title>
  <style>
    :root {
      --bg: #f6f7f9;
      --ink: #1c1e21;
      --muted: #6b7280;
      --line: #e5e7eb;
      --card: #ffffff;
      --accent: #2f4858;
      --accent-soft: #e8eef2;
      --danger: #c63b2b;
      --ok: #2d7a4b;
      --shadow: 0 10px 30px rgba(28, 30, 33, 0.08);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      display: grid;
      grid-template-columns: 220px 1fr;
    }

    aside {
      background: var(--accent);
      color: #eef2f5;
      padding: 24px 16px;
      display: flex;
      flex-direction: column;
      gap: 24px;
    }

    aside .brand {
      font-size: 1.25rem;
      font-weight: 700;
      letter-spacing: 0.02em;
    }

    aside nav {
      display: flex;
      flex-direction: column;
      gap: 4px;
    }

    aside nav a {
      color: #cdd8df;
      text-decoration: none;
      padding: 10px 12px;
      border-radius: 10px;
      font-size: 0.95rem;
    }

    aside nav a:hover { background: rgba(255, 255, 255, 0.08); color: #fff; }
    aside nav a.active { background: rgba(255, 255, 255, 0.16); color: #fff; font-weight: 600; }

    main { padding: 24px 32px 48px; }

    .breadcrumb {
      color: var(--muted);
      font-size: 0.9rem;
      margin-bottom: 20px;
      display: flex;
      align-items: center;
      gap: 8px;
    }

    .breadcrumb a { color: var(--muted); text-decoration: none; }
    .breadcrumb a:hover { color: var(--ink); }
    .breadcrumb .current { color: var(--ink); font-weight: 600; }
    .breadcrumb .sep { color: var(--line); }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 24px;
      margin-bottom: 24px;
    }

    .card h2 { margin: 0 0 4px; font-size: 1.2rem; }
    .card .hint { margin: 0 0 16px; color: var(--muted); font-size: 0.9rem; }

    .page-head {
      display: flex;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 20px;
    }

    .page-head h1 { margin: 0; font-size: 1.6rem; }

    .stat-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
      margin-bottom: 24px;
    }

    .stat {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 14px;
      padding: 18px;
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value { display: block; margin-top: 6px; font-size: 1.6rem; font-weight: 700; }

    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 10px 12px; border-bottom: 1px solid var(--line); font-size: 0.95rem; }
    th { color: var(--muted); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.08em; }
    td.amount, th.amount { text-align: right; }
    td.actions { text-align: right; white-space: nowrap; }
    td.empty { text-align: center; color: var(--muted); padding: 28px; }
    tr:last-child td { border-bottom: none; }
    table a { color: var(--accent); font-weight: 600; text-decoration: none; }

    .btn {
      appearance: none;
      border: none;
      border-radius: 10px;
      padding: 9px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: #fff;
      text-decoration: none;
      display: inline-block;
    }

    .btn:disabled { opacity: 0.6; cursor: wait; }
    .btn.ghost { background: var(--accent-soft); color: var(--accent); }
    .btn.danger { background: #fbeae7; color: var(--danger); }
    .btn + .btn { margin-left: 6px; }

    .badge {
      display: inline-block;
      padding: 3px 10px;
      border-radius: 999px;
      font-size: 0.8rem;
      font-weight: 600;
    }

    .badge.paid { background: #e3f3e9; color: var(--ok); }
    .badge.sent { background: var(--accent-soft); color: var(--accent); }
    .badge.unpaid { background: #fdf3dc; color: #8a6d1d; }
    .badge.overdue { background: #fbeae7; color: var(--danger); }
    .badge.draft { background: #eef0f3; color: var(--muted); }

    .error-text { color: var(--danger); font-size: 0.9rem; min-height: 1.2em; margin: 8px 0 0; }

    dialog {
      border: none;
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 24px;
      width: min(420px, 90vw);
    }

    dialog::backdrop { background: rgba(28, 30, 33, 0.4); }
    dialog h3 { margin: 0 0 16px; }
    dialog form { display: flex; flex-direction: column; gap: 12px; }
    dialog .row-actions { display: flex; justify-content: flex-end; gap: 8px; margin-top: 8px; }

    label { font-size: 0.85rem; color: var(--muted); display: block; margin-bottom: 4px; }

    input, select {
      width: 100%;
      padding: 9px 10px;
      border: 1px solid var(--line);
      border-radius: 8px;
      font-size: 0.95rem;
      background: #fff;
    }

    .chart-card svg { width: 100%; height: auto; display: block; }
    .bar { fill: var(--accent); opacity: 0.85; }
    .chart-label { fill: var(--muted); font-size: 11px; }

    .client-list { list-style: none; margin: 0; padding: 0; }
    .client-row { display: flex; align-items: center; justify-content: space-between; padding: 10px 0; border-bottom: 1px solid var(--line); }
    .client-row:last-child { border-bottom: none; }
    .client-name { display: block; font-weight: 600; }
    .client-email { display: block; color: var(--muted); font-size: 0.85rem; }
    li.empty { color: var(--muted); padding: 20px 0; }

    .totals { display: flex; justify-content: flex-end; margin-top: 16px; }
    .totals .box { min-width: 240px; }
    .totals .line { display: flex; justify-content: space-between; padding: 4px 0; }
    .totals .grand { border-top: 1px solid var(--line); font-weight: 700; font-size: 1.05rem; padding-top: 8px; margin-top: 4px; }

    .detail-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 20px; }
    .detail-grid .label { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.08em; color: var(--muted); display: block; }
    .detail-grid .value { display: block; margin-top: 4px; font-weight: 600; }
    .toolbar { display: flex; gap: 8px; flex-wrap: wrap; }
    .extra h3 { margin: 16px 0 4px; font-size: 1rem; }
    .extra p { margin: 0; color: var(--muted); }

    @media (max-width: 720px) {
      body { grid-template-columns: 1fr; }
      aside { flex-direction: row; align-items: center; justify-content: space-between; }
      aside nav { flex-direction: row; }
      main { padding: 20px 16px 40px; }
    }

    @media print {
      aside, .breadcrumb, .toolbar, .btn { display: none !important; }
      body { grid-template-columns: 1fr; background: #fff; }
      .card { box-shadow: none; border: none; }
    }
  </style>
</head>
<body>
  <aside>
    <div class="brand">Invoice Admin</div>
    <nav>
      <a class="{{ACTIVE_DASHBOARD}}" href="/dashboard">Dashboard</a>
      <a class="{{ACTIVE_CLIENTS}}" href="/clients">Clients</a>
      <a class="{{ACTIVE_INVOICES}}" href="/invoices">Invoices</a>
    </nav>
  </aside>
  <main>
    <div class="breadcrumb">{{BREADCRUMB}}</div>
    {{CONTENT}}
  </main>
</body>
</html>
"#;

const ERROR_HTML: &str = r#"<div class="card">
  <h2>{{ERROR_TITLE}}</h2>
  <p class="error-text">{{ERROR_MESSAGE}}</p>
</div>
"#;

const DASHBOARD_HTML: &str = r#"<div class="page-head">
  <h1>Dashboard</h1>
  <a class="btn" href="/invoices/new">New Invoice</a>
</div>

<div class="stat-grid">
  <div class="stat">
    <span class="label">Yearly Revenue</span>
    <span class="value">{{YEARLY_REVENUE}}</span>
  </div>
  <div class="stat">
    <span class="label">Outstanding</span>
    <span class="value">{{TOTAL_OUTSTANDING}}</span>
  </div>
  <div class="stat">
    <span class="label">Total Clients</span>
    <span class="value">{{TOTAL_CLIENTS}}</span>
  </div>
</div>

<div class="card chart-card">
  <h2>Monthly Revenue</h2>
  <p class="hint">Paid invoices over the last 12 months.</p>
  {{CHART}}
</div>

<div class="card">
  <h2>Recent Clients</h2>
  <p class="hint">Jump straight to a new invoice.</p>
  <ul class="client-list">{{CLIENT_ROWS}}</ul>
</div>
"#;

const CLIENTS_HTML: &str = r#"<div class="page-head">
  <h1>Clients</h1>
  <button class="btn" id="add-client">Add Client</button>
</div>

<div class="card">
  <table>
    <thead>
      <tr><th>Name</th><th>Email</th><th></th></tr>
    </thead>
    <tbody>{{ROWS}}</tbody>
  </table>
</div>

<dialog id="client-dialog">
  <h3 id="client-dialog-title">Add Client</h3>
  <form id="client-form">
    <div>
      <label for="client-name">Name</label>
      <input id="client-name" name="name" required />
    </div>
    <div>
      <label for="client-email">Email</label>
      <input id="client-email" name="email" type="email" required />
    </div>
    <p class="error-text" id="client-form-error"></p>
    <div class="row-actions">
      <button type="button" class="btn ghost" id="client-cancel">Cancel</button>
      <button type="submit" class="btn" id="client-save">Save</button>
    </div>
  </form>
</dialog>

<dialog id="delete-dialog">
  <h3>Delete client?</h3>
  <p>This will permanently remove <strong id="delete-label"></strong> and their invoices.</p>
  <p class="error-text" id="delete-error"></p>
  <div class="row-actions">
    <button type="button" class="btn ghost" id="delete-cancel">Cancel</button>
    <button type="button" class="btn danger" id="delete-confirm">Delete</button>
  </div>
</dialog>

<script>
  const clientDialog = document.getElementById('client-dialog');
  const clientForm = document.getElementById('client-form');
  const clientError = document.getElementById('client-form-error');
  const clientSave = document.getElementById('client-save');
  const deleteDialog = document.getElementById('delete-dialog');
  const deleteError = document.getElementById('delete-error');
  const deleteConfirm = document.getElementById('delete-confirm');
  let editId = null;
  let deleteId = null;

  const openClientDialog = (id, name, email) => {
    editId = id;
    document.getElementById('client-dialog-title').textContent = id ? 'Edit Client' : 'Add Client';
    document.getElementById('client-name').value = name || '';
    document.getElementById('client-email').value = email || '';
    clientError.textContent = '';
    clientDialog.showModal();
  };

  document.getElementById('add-client').addEventListener('click', () => openClientDialog(null));
  document.querySelectorAll('.edit-client').forEach((button) => {
    button.addEventListener('click', () =>
      openClientDialog(button.dataset.id, button.dataset.name, button.dataset.email));
  });

  document.getElementById('client-cancel').addEventListener('click', () => clientDialog.close());

  clientForm.addEventListener('submit', async (event) => {
    event.preventDefault();
    clientError.textContent = '';
    clientSave.disabled = true;
    const body = JSON.stringify({
      name: document.getElementById('client-name').value,
      email: document.getElementById('client-email').value
    });
    const url = editId ? '/api/clients/' + editId : '/api/clients';
    const method = editId ? 'PUT' : 'POST';
    try {
      const res = await fetch(url, { method, headers: { 'content-type': 'application/json' }, body });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      location.reload();
    } catch (err) {
      clientError.textContent = err.message;
      clientSave.disabled = false;
    }
  });

  document.querySelectorAll('.delete-client').forEach((button) => {
    button.addEventListener('click', () => {
      deleteId = button.dataset.id;
      document.getElementById('delete-label').textContent = button.dataset.label;
      deleteError.textContent = '';
      deleteDialog.showModal();
    });
  });

  document.getElementById('delete-cancel').addEventListener('click', () => deleteDialog.close());

  deleteConfirm.addEventListener('click', async () => {
    deleteError.textContent = '';
    deleteConfirm.disabled = true;
    try {
      const res = await fetch('/api/clients/' + deleteId, { method: 'DELETE' });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      location.reload();
    } catch (err) {
      deleteError.textContent = err.message;
      deleteConfirm.disabled = false;
    }
  });
</script>
"#;

const INVOICES_HTML: &str = r#"<div class="page-head">
  <h1>Invoices</h1>
  <a class="btn" href="/invoices/new">New Invoice</a>
</div>

<div class="card">
  <table>
    <thead>
      <tr><th>Number</th><th>Client</th><th>Issued</th><th>Due</th><th>Status</th><th class="amount">Total</th><th></th></tr>
    </thead>
    <tbody>{{ROWS}}</tbody>
  </table>
</div>

<dialog id="delete-dialog">
  <h3>Delete invoice?</h3>
  <p>This will permanently remove invoice <strong id="delete-label"></strong>.</p>
  <p class="error-text" id="delete-error"></p>
  <div class="row-actions">
    <button type="button" class="btn ghost" id="delete-cancel">Cancel</button>
    <button type="button" class="btn danger" id="delete-confirm">Delete</button>
  </div>
</dialog>

<script>
  const deleteDialog = document.getElementById('delete-dialog');
  const deleteError = document.getElementById('delete-error');
  const deleteConfirm = document.getElementById('delete-confirm');
  let deleteId = null;

  document.querySelectorAll('.delete-invoice').forEach((button) => {
    button.addEventListener('click', () => {
      deleteId = button.dataset.id;
      document.getElementById('delete-label').textContent = button.dataset.label;
      deleteError.textContent = '';
      deleteDialog.showModal();
    });
  });

  document.getElementById('delete-cancel').addEventListener('click', () => deleteDialog.close());

  deleteConfirm.addEventListener('click', async () => {
    deleteError.textContent = '';
    deleteConfirm.disabled = true;
    try {
      const res = await fetch('/api/invoices/' + deleteId, { method: 'DELETE' });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      location.reload();
    } catch (err) {
      deleteError.textContent = err.message;
      deleteConfirm.disabled = false;
    }
  });
</script>
"#;

const INVOICE_DETAIL_HTML: &str = r#"<div class="page-head">
  <h1>Invoice {{NUMBER}}</h1>
  <div class="toolbar">
    {{STATUS_BUTTONS}}
    <button class="btn ghost" id="pdf-btn" data-id="{{ID}}" data-number="{{NUMBER_ATTR}}">Download PDF</button>
    <button class="btn ghost" id="print-btn">Print</button>
    <a class="btn ghost" href="/invoices">Back</a>
  </div>
</div>

<p class="error-text" id="page-error"></p>

<div class="card">
  <div class="detail-grid">
    <div><span class="label">Billed To</span><span class="value">{{CLIENT_NAME}}</span><span class="client-email">{{CLIENT_EMAIL}}</span></div>
    <div><span class="label">Issue Date</span><span class="value">{{ISSUE_DATE}}</span></div>
    <div><span class="label">Due Date</span><span class="value">{{DUE_DATE}}</span></div>
    <div><span class="label">Status</span><span class="{{STATUS_CLASS}}">{{STATUS}}</span></div>
  </div>

  <table>
    <thead>
      <tr><th>Description</th><th class="amount">Qty</th><th class="amount">Unit Price</th><th class="amount">Subtotal</th></tr>
    </thead>
    <tbody>{{ITEM_ROWS}}</tbody>
  </table>

  <div class="totals">
    <div class="box">
      <div class="line grand"><span>Total</span><span>{{TOTAL}}</span></div>
    </div>
  </div>

  {{EXTRAS}}
</div>

<script>
  const pageError = document.getElementById('page-error');
  const statusButtons = Array.from(document.querySelectorAll('.status-btn'));
  const pdfButton = document.getElementById('pdf-btn');
  const invoiceId = pdfButton.dataset.id;

  statusButtons.forEach((button) => {
    button.addEventListener('click', async () => {
      pageError.textContent = '';
      statusButtons.forEach((b) => { b.disabled = true; });
      try {
        const res = await fetch('/api/invoices/' + invoiceId + '/status', {
          method: 'PATCH',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ status: button.dataset.status })
        });
        if (!res.ok) {
          throw new Error((await res.text()) || 'Failed to update status.');
        }
        location.reload();
      } catch (err) {
        pageError.textContent = err.message;
        statusButtons.forEach((b) => { b.disabled = false; });
      }
    });
  });

  pdfButton.addEventListener('click', async () => {
    pageError.textContent = '';
    pdfButton.disabled = true;
    const number = pdfButton.dataset.number;
    try {
      const res = await fetch('/invoices/' + invoiceId + '/pdf?number=' + encodeURIComponent(number));
      if (!res.ok) {
        throw new Error((await res.text()) || 'PDF download failed.');
      }
      let filename = 'invoice_' + (number || invoiceId) + '.pdf';
      const disposition = res.headers.get('Content-Disposition');
      if (disposition && disposition.includes('attachment')) {
        const match = disposition.match(/filename[^;=\n]*=((['"]).*?\2|[^;\n]*)/);
        if (match && match[1]) {
          filename = match[1].replace(/['"]/g, '');
        }
      }
      const blob = await res.blob();
      const url = window.URL.createObjectURL(blob);
      const a = document.createElement('a');
      a.href = url;
      a.download = filename;
      document.body.appendChild(a);
      a.click();
      a.remove();
      window.URL.revokeObjectURL(url);
    } catch (err) {
      pageError.textContent = err.message;
    } finally {
      pdfButton.disabled = false;
    }
  });

  document.getElementById('print-btn').addEventListener('click', () => window.print());
</script>
"#;

const NEW_INVOICE_HTML: &str = r#"<div class="page-head">
  <h1>Create New Invoice</h1>
  <a class="btn ghost" href="/invoices">Back to Invoices</a>
</div>

<div class="card">
  <form id="invoice-form">
    <div class="detail-grid">
      <div>
        <label for="client-select">Client</label>
        <div style="display: flex; gap: 6px;">
          <select id="client-select">{{CLIENT_OPTIONS}}</select>
          <button type="button" class="btn ghost" id="new-client-btn" aria-label="Add new client">+</button>
        </div>
      </div>
      <div>
        <label for="invoice-number">Invoice Number</label>
        <input id="invoice-number" placeholder="e.g., INV-001" />
      </div>
      <div>
        <label for="issue-date">Issue Date</label>
        <input id="issue-date" type="date" />
      </div>
      <div>
        <label for="due-date">Due Date</label>
        <input id="due-date" type="date" />
      </div>
    </div>

    <h2>Line Items</h2>
    <table>
      <thead>
        <tr><th>Description</th><th class="amount">Quantity</th><th class="amount">Unit Price</th><th class="amount">Total</th><th></th></tr>
      </thead>
      <tbody id="line-items"></tbody>
    </table>
    <button type="button" class="btn ghost" id="add-row">+ Add Item</button>

    <div class="totals">
      <div class="box">
        <div class="line"><span>Subtotal</span><span id="subtotal">$0.00</span></div>
        <div class="line grand"><span>Grand Total</span><span id="grand-total">$0.00</span></div>
      </div>
    </div>

    <p class="error-text" id="form-error"></p>

    <div class="row-actions">
      <a class="btn ghost" href="/invoices">Cancel</a>
      <button type="submit" class="btn" id="save-btn">Save Invoice</button>
    </div>
  </form>
</div>

<dialog id="new-client-dialog">
  <h3>Add New Client</h3>
  <form id="new-client-form">
    <div>
      <label for="new-client-name">Client Name</label>
      <input id="new-client-name" required />
    </div>
    <div>
      <label for="new-client-email">Client Email</label>
      <input id="new-client-email" type="email" required />
    </div>
    <p class="error-text" id="new-client-error"></p>
    <div class="row-actions">
      <button type="button" class="btn ghost" id="new-client-cancel">Cancel</button>
      <button type="submit" class="btn" id="new-client-save">Create Client</button>
    </div>
  </form>
</dialog>

<script>
  const rowsBody = document.getElementById('line-items');
  const formError = document.getElementById('form-error');
  const saveButton = document.getElementById('save-btn');
  const clientSelect = document.getElementById('client-select');
  let rowKey = 0;

  const formatUsd = (amount) =>
    new Intl.NumberFormat('en-US', { style: 'currency', currency: 'USD' }).format(amount || 0);

  const addRow = () => {
    rowKey += 1;
    const row = document.createElement('tr');
    row.dataset.key = String(rowKey);
    row.innerHTML = `
      <td><input class="item-description" placeholder="Service or product" /></td>
      <td><input class="item-quantity" type="number" min="0" value="1" /></td>
      <td><input class="item-price" type="number" min="0" step="0.01" value="0" /></td>
      <td class="amount item-total">$0.00</td>
      <td class="actions"><button type="button" class="btn danger remove-row">×</button></td>`;
    row.querySelectorAll('input').forEach((input) => input.addEventListener('input', recompute));
    row.querySelector('.remove-row').addEventListener('click', () => {
      row.remove();
      recompute();
    });
    rowsBody.appendChild(row);
    recompute();
  };

  const rowValues = (row) => ({
    description: row.querySelector('.item-description').value,
    quantity: parseFloat(row.querySelector('.item-quantity').value) || 0,
    unit_price: parseFloat(row.querySelector('.item-price').value) || 0
  });

  const rowIsBlank = (item) =>
    item.description.trim() === '' && item.quantity === 1 && item.unit_price === 0;

  const recompute = () => {
    const rows = Array.from(rowsBody.children);
    let total = 0;
    rows.forEach((row) => {
      const item = rowValues(row);
      const subtotal = item.quantity * item.unit_price;
      total += subtotal;
      row.querySelector('.item-total').textContent = formatUsd(subtotal);
      // The lone blank default row cannot be removed.
      const removable = rows.length > 1 || !rowIsBlank(item);
      row.querySelector('.remove-row').style.visibility = removable ? 'visible' : 'hidden';
    });
    document.getElementById('subtotal').textContent = formatUsd(total);
    document.getElementById('grand-total').textContent = formatUsd(total);
  };

  document.getElementById('add-row').addEventListener('click', addRow);
  addRow();

  document.getElementById('invoice-form').addEventListener('submit', async (event) => {
    event.preventDefault();
    formError.textContent = '';

    const issueDate = document.getElementById('issue-date').value;
    const dueDate = document.getElementById('due-date').value;
    if (!clientSelect.value || !issueDate || !dueDate) {
      formError.textContent = 'Client, Issue Date, and Due Date are required.';
      return;
    }
    const items = Array.from(rowsBody.children)
      .map(rowValues)
      .filter((item) => item.description.trim() !== '');
    if (items.length === 0) {
      formError.textContent = 'At least one line item with a description is required.';
      return;
    }

    saveButton.disabled = true;
    try {
      const res = await fetch('/api/invoices', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({
          client_id: Number(clientSelect.value),
          invoice_number: document.getElementById('invoice-number').value,
          issue_date: issueDate,
          due_date: dueDate,
          service_items: items
        })
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Failed to create invoice.');
      }
      location.href = '/invoices';
    } catch (err) {
      formError.textContent = err.message;
      saveButton.disabled = false;
    }
  });

  // Inline create-client: append + auto-select without a full refetch.
  const newClientDialog = document.getElementById('new-client-dialog');
  const newClientError = document.getElementById('new-client-error');
  const newClientSave = document.getElementById('new-client-save');

  document.getElementById('new-client-btn').addEventListener('click', () => {
    newClientError.textContent = '';
    newClientDialog.showModal();
  });
  document.getElementById('new-client-cancel').addEventListener('click', () => {
    document.getElementById('new-client-name').value = '';
    document.getElementById('new-client-email').value = '';
    newClientDialog.close();
  });

  document.getElementById('new-client-form').addEventListener('submit', async (event) => {
    event.preventDefault();
    newClientError.textContent = '';
    newClientSave.disabled = true;
    try {
      const res = await fetch('/api/clients', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({
          name: document.getElementById('new-client-name').value,
          email: document.getElementById('new-client-email').value
        })
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Failed to create client.');
      }
      const client = await res.json();
      const option = document.createElement('option');
      option.value = String(client.id);
      option.textContent = client.name;
      clientSelect.appendChild(option);
      clientSelect.value = String(client.id);
      document.getElementById('new-client-name').value = '';
      document.getElementById('new-client-email').value = '';
      newClientDialog.close();
    } catch (err) {
      newClientError.textContent = err.message;
    } finally {
      newClientSave.disabled = false;
    }
  });
</script>
"#;
