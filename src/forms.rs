use crate::models::{ClientInput, CreateInvoice, NewInvoiceRequest, ServiceItemInput};

pub const MISSING_INVOICE_FIELDS: &str = "Client, Issue Date, and Due Date are required.";
pub const MISSING_LINE_ITEM: &str = "At least one line item with a description is required.";
pub const MISSING_CLIENT_FIELDS: &str = "Name and email are required.";

pub fn line_subtotal(item: &ServiceItemInput) -> f64 {
    item.quantity * item.unit_price
}

/// Running total as displayed while editing: blank rows still count.
pub fn grand_total(items: &[ServiceItemInput]) -> f64 {
    items.iter().map(line_subtotal).sum()
}

/// Rows that actually get submitted. Blank-description rows are draft
/// scaffolding and are dropped here.
pub fn submittable_items(items: &[ServiceItemInput]) -> Vec<ServiceItemInput> {
    items
        .iter()
        .filter(|item| !item.description.trim().is_empty())
        .cloned()
        .collect()
}

/// Pre-flight validation for the new-invoice form. A failure here means no
/// upstream request is made at all.
pub fn validate_new_invoice(request: &NewInvoiceRequest) -> Result<CreateInvoice, String> {
    let Some(client_id) = request.client_id else {
        return Err(MISSING_INVOICE_FIELDS.to_string());
    };
    if request.issue_date.trim().is_empty() || request.due_date.trim().is_empty() {
        return Err(MISSING_INVOICE_FIELDS.to_string());
    }

    let service_items = submittable_items(&request.service_items);
    if service_items.is_empty() {
        return Err(MISSING_LINE_ITEM.to_string());
    }

    Ok(CreateInvoice {
        client_id,
        invoice_number: request.invoice_number.trim().to_string(),
        issue_date: request.issue_date.trim().to_string(),
        due_date: request.due_date.trim().to_string(),
        service_items,
    })
}

pub fn validate_client(input: &ClientInput) -> Result<ClientInput, String> {
    let name = input.name.trim();
    let email = input.email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(MISSING_CLIENT_FIELDS.to_string());
    }
    Ok(ClientInput {
        name: name.to_string(),
        email: email.to_string(),
    })
}
