//! Read-only nomenclature endpoints.
//!
//! Every request can carry its own access token, which then bypasses the
//! client's token cache for that call.

use crate::context::CallContext;
use crate::error::Result;
use crate::models::{Client, Company, Language, Management, Product, Series, VatRate};
use crate::response::Response;
use crate::rest::{OblioClient, Payload};
use reqwest::Method;
use serde::Serialize;

pub type GetCompaniesResponse = Response<Vec<Company>>;
pub type GetVatRatesResponse = Response<Vec<VatRate>>;
pub type GetClientsResponse = Response<Vec<Client>>;
pub type GetProductsResponse = Response<Vec<Product>>;
pub type GetSeriesResponse = Response<Vec<Series>>;
pub type GetLanguagesResponse = Response<Vec<Language>>;
pub type GetManagementResponse = Response<Vec<Management>>;

fn is_zero(n: &u32) -> bool {
    *n == 0
}

macro_rules! impl_token_bearing {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Payload for $ty {
                fn access_token(&self) -> Option<&str> {
                    self.access_token.as_deref()
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetCompaniesRequest {
    #[serde(skip)]
    pub access_token: Option<String>,
}

/// Request filtered by company only
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyRequest {
    #[serde(skip)]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,
}

impl CompanyRequest {
    pub fn new(cif: impl Into<String>) -> Self {
        CompanyRequest {
            access_token: None,
            cif: cif.into(),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

pub type GetVatRatesRequest = CompanyRequest;
pub type GetSeriesRequest = CompanyRequest;
pub type GetLanguagesRequest = CompanyRequest;
pub type GetManagementRequest = CompanyRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetClientsRequest {
    #[serde(skip)]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_cif: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductsRequest {
    #[serde(skip)]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub management: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub work_station: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub offset: u32,
}

impl_token_bearing!(
    GetCompaniesRequest,
    CompanyRequest,
    GetClientsRequest,
    GetProductsRequest,
);

impl OblioClient {
    fn nomenclature<P, R>(&self, ctx: &CallContext, name: &str, req: &P) -> Result<R>
    where
        P: Payload,
        R: serde::de::DeserializeOwned,
    {
        self.execute(ctx, Method::GET, &format!("/nomenclature/{}", name), req)
    }

    /// Companies the credentials give access to
    pub fn get_companies(
        &self,
        ctx: &CallContext,
        req: &GetCompaniesRequest,
    ) -> Result<GetCompaniesResponse> {
        self.nomenclature(ctx, "companies", req)
    }

    pub fn get_vat_rates(
        &self,
        ctx: &CallContext,
        req: &GetVatRatesRequest,
    ) -> Result<GetVatRatesResponse> {
        self.nomenclature(ctx, "vat_rates", req)
    }

    pub fn get_clients(
        &self,
        ctx: &CallContext,
        req: &GetClientsRequest,
    ) -> Result<GetClientsResponse> {
        self.nomenclature(ctx, "clients", req)
    }

    pub fn get_products(
        &self,
        ctx: &CallContext,
        req: &GetProductsRequest,
    ) -> Result<GetProductsResponse> {
        self.nomenclature(ctx, "products", req)
    }

    pub fn get_series(
        &self,
        ctx: &CallContext,
        req: &GetSeriesRequest,
    ) -> Result<GetSeriesResponse> {
        self.nomenclature(ctx, "series", req)
    }

    pub fn get_languages(
        &self,
        ctx: &CallContext,
        req: &GetLanguagesRequest,
    ) -> Result<GetLanguagesResponse> {
        self.nomenclature(ctx, "languages", req)
    }

    pub fn get_management(
        &self,
        ctx: &CallContext,
        req: &GetManagementRequest,
    ) -> Result<GetManagementResponse> {
        self.nomenclature(ctx, "management", req)
    }
}
