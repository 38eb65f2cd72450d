//! Document endpoints: invoices, proformas and notices.

use crate::context::CallContext;
use crate::error::{OblioError, Result};
use crate::models::{Client, Collect, Document, DocumentRow, Invoice, ReferenceDocument};
use crate::response::Response;
use crate::rest::{OblioClient, Payload};
use crate::wire::{Bool, Date, Int};
use reqwest::Method;
use serde::Serialize;

pub type DocumentResponse = Response<Document>;
pub type GetInvoicesResponse = Response<Vec<Invoice>>;

/// Kind of document, selecting the `/docs/<kind>` endpoint family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Invoice,
    Proforma,
    Notice,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Proforma => "proforma",
            DocumentKind::Notice => "notice",
        }
    }

    fn path(&self, action: Option<&str>) -> String {
        match action {
            Some(action) => format!("/docs/{}/{}", self.as_str(), action),
            None => format!("/docs/{}", self.as_str()),
        }
    }
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OblioError::invalid_argument(format!("{} is empty", field)));
    }
    Ok(())
}

/// Identifies one existing document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub cif: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub number: String,
}

impl DocumentRequest {
    pub fn new(
        cif: impl Into<String>,
        series_name: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        DocumentRequest {
            cif: cif.into(),
            series_name: series_name.into(),
            number: number.into(),
        }
    }
}

impl Payload for DocumentRequest {
    fn validate(&self) -> Result<()> {
        require(&self.cif, "cif")
    }
}

/// Fields shared by every create-document request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub cif: String,
    pub client: Client,
    #[serde(skip_serializing_if = "Date::is_zero")]
    pub issue_date: Date,
    #[serde(skip_serializing_if = "Date::is_zero")]
    pub due_date: Date,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "Int::is_zero")]
    pub precision: Int,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    pub products: Vec<DocumentRow>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issuer_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issuer_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub internal_note: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deputy_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deputy_identity_card: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deputy_auto: String,
    // spelled this way by the API
    #[serde(rename = "selesAgent", skip_serializing_if = "String::is_empty")]
    pub sales_agent: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mentions: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub work_station: String,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub send_email: Bool,
}

impl Payload for CreateDocumentRequest {
    fn validate(&self) -> Result<()> {
        require(&self.cif, "cif")
    }
}

pub type CreateProformaRequest = CreateDocumentRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[serde(flatten)]
    pub document: CreateDocumentRequest,
    #[serde(skip_serializing_if = "Date::is_zero")]
    pub delivery_date: Date,
    #[serde(skip_serializing_if = "Date::is_zero")]
    pub collect_date: Date,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notice_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect: Option<Collect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_document: Option<ReferenceDocument>,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub use_stock: Bool,
}

impl Payload for CreateInvoiceRequest {
    fn validate(&self) -> Result<()> {
        self.document.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeRequest {
    #[serde(flatten)]
    pub document: CreateDocumentRequest,
    /// Always sent; the notice endpoint treats a missing flag as "use stock"
    pub use_stock: Bool,
}

impl Payload for CreateNoticeRequest {
    fn validate(&self) -> Result<()> {
        self.document.validate()
    }
}

/// Record payments against an invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub cif: String,
    pub series_name: String,
    pub number: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collects: Vec<Collect>,
}

impl Payload for CollectRequest {
    fn validate(&self) -> Result<()> {
        require(&self.cif, "cif")?;
        require(&self.series_name, "seriesName")?;
        require(&self.number, "number")
    }
}

/// Client filter of [`GetInvoicesRequest`], sent as `client[...]` parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientFilter {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderBy {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "issueDate")]
    IssueDate,
    #[serde(rename = "number")]
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderDir {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// Filters for listing invoices
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInvoicesRequest {
    pub cif: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub number: String,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub draft: Bool,
    pub client: ClientFilter,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub canceled: Bool,
    #[serde(skip_serializing_if = "Date::is_zero")]
    pub issued_after: Date,
    #[serde(skip_serializing_if = "Date::is_zero")]
    pub issued_before: Date,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub with_products: Bool,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub with_e_invoice_status: Bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_dir: Option<OrderDir>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl Payload for GetInvoicesRequest {
    fn validate(&self) -> Result<()> {
        require(&self.cif, "cif")
    }
}

impl OblioClient {
    /// Fetch one document
    pub fn get_document(
        &self,
        ctx: &CallContext,
        kind: DocumentKind,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::GET, &kind.path(None), req)
    }

    /// Cancel a document
    pub fn cancel_document(
        &self,
        ctx: &CallContext,
        kind: DocumentKind,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::PUT, &kind.path(Some("cancel")), req)
    }

    /// Restore a cancelled document
    pub fn restore_document(
        &self,
        ctx: &CallContext,
        kind: DocumentKind,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::PUT, &kind.path(Some("restore")), req)
    }

    /// Delete a document; only the last one of a series can be deleted
    pub fn delete_document(
        &self,
        ctx: &CallContext,
        kind: DocumentKind,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::DELETE, &kind.path(None), req)
    }

    pub fn create_invoice(
        &self,
        ctx: &CallContext,
        req: &CreateInvoiceRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::POST, &DocumentKind::Invoice.path(None), req)
    }

    pub fn get_invoice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.get_document(ctx, DocumentKind::Invoice, req)
    }

    pub fn get_invoices(
        &self,
        ctx: &CallContext,
        req: &GetInvoicesRequest,
    ) -> Result<GetInvoicesResponse> {
        self.execute(ctx, Method::GET, &DocumentKind::Invoice.path(Some("list")), req)
    }

    pub fn cancel_invoice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.cancel_document(ctx, DocumentKind::Invoice, req)
    }

    pub fn restore_invoice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.restore_document(ctx, DocumentKind::Invoice, req)
    }

    pub fn delete_invoice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.delete_document(ctx, DocumentKind::Invoice, req)
    }

    /// Record payments against an invoice
    pub fn collect(&self, ctx: &CallContext, req: &CollectRequest) -> Result<DocumentResponse> {
        self.execute(ctx, Method::PUT, &DocumentKind::Invoice.path(Some("collect")), req)
    }

    pub fn create_proforma(
        &self,
        ctx: &CallContext,
        req: &CreateProformaRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::POST, &DocumentKind::Proforma.path(None), req)
    }

    pub fn get_proforma(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.get_document(ctx, DocumentKind::Proforma, req)
    }

    pub fn cancel_proforma(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.cancel_document(ctx, DocumentKind::Proforma, req)
    }

    pub fn restore_proforma(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.restore_document(ctx, DocumentKind::Proforma, req)
    }

    pub fn delete_proforma(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.delete_document(ctx, DocumentKind::Proforma, req)
    }

    pub fn create_notice(
        &self,
        ctx: &CallContext,
        req: &CreateNoticeRequest,
    ) -> Result<DocumentResponse> {
        self.execute(ctx, Method::POST, &DocumentKind::Notice.path(None), req)
    }

    pub fn get_notice(&self, ctx: &CallContext, req: &DocumentRequest) -> Result<DocumentResponse> {
        self.get_document(ctx, DocumentKind::Notice, req)
    }

    pub fn cancel_notice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.cancel_document(ctx, DocumentKind::Notice, req)
    }

    pub fn restore_notice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.restore_document(ctx, DocumentKind::Notice, req)
    }

    pub fn delete_notice(
        &self,
        ctx: &CallContext,
        req: &DocumentRequest,
    ) -> Result<DocumentResponse> {
        self.delete_document(ctx, DocumentKind::Notice, req)
    }
}
