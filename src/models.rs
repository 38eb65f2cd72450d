//! Records exchanged with the document and nomenclature endpoints.

use crate::error::Result;
use crate::wire::{Bool, Date, Int};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// Rounding precision: two decimals
pub const SIMPLE_PRECISION: i64 = 2;
/// Rounding precision: four decimals
pub const DOUBLE_PRECISION: i64 = 4;

fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

/// String-valued enum whose unknown values land in `Other` instead of
/// failing the whole response.
macro_rules! open_string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A value this crate does not know about, kept verbatim
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(s) => s,
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($wire => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::from(s.as_str()))
            }
        }
    };
}

/// A company the credentials give access to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub cif: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub user_type_access: String,
    #[serde(default)]
    pub use_stock: Bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VatRate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub default: bool,
}

/// Customer data, both as a nomenclature record and as the buyer of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cif: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rc: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iban: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bank: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact: String,
    #[serde(default, skip_serializing_if = "Bool::is_false")]
    pub vat_payer: Bool,
    /// Save the client to the nomenclature when issuing the document
    #[serde(default, skip_serializing_if = "Bool::is_false")]
    pub save: Bool,
    #[serde(default, skip_serializing_if = "Bool::is_false")]
    pub autocomplete: Bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(default)]
    pub work_station: String,
    #[serde(default)]
    pub management: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub vat_name: String,
    #[serde(default)]
    pub vat_percentage: f64,
    #[serde(default)]
    pub vat_included: bool,
}

open_string_enum! {
    pub enum ProductType {
        Merchandise => "Marfa",
        Service => "Serviciu",
        RawMaterial => "Materii prime",
        Consumable => "Materiale consumabile",
        SemiFinished => "Semifabricate",
        Finished => "Produs finit",
        Waste => "Produs rezidual",
        Agricultural => "Produse agricole",
        Livestock => "Animale si pasari",
        Packing => "Ambalaje",
        Inventory => "Obiecte de inventar",
        Unspecified => "-",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub measuring_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stock: Vec<Stock>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub price: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vat_name: String,
    #[serde(default, skip_serializing_if = "Int::is_zero")]
    pub vat_percentage: Int,
    #[serde(default, skip_serializing_if = "Bool::is_false")]
    pub vat_included: Bool,
    #[serde(default, skip_serializing_if = "Bool::is_false")]
    pub active: Bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
}

/// Document series configured for a company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Management {
    #[serde(default)]
    pub management: String,
    #[serde(default)]
    pub work_station: String,
    #[serde(default)]
    pub management_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountType {
    #[serde(rename = "procentual")]
    Percentage,
    #[serde(rename = "valoric")]
    Flat,
}

/// Discount row applied to the products listed before it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_item: String,
    pub name: String,
    pub discount: f64,
    pub discount_type: DiscountType,
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub discount_all_above: Bool,
}

/// Product line of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub management: String,
    pub quantity: f64,
    /// Save the product to the nomenclature
    #[serde(skip_serializing_if = "Bool::is_false")]
    pub save: Bool,
}

/// A row in a document's `products` list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentRow {
    Product(ProductRow),
    Discount(Discount),
}

impl From<ProductRow> for DocumentRow {
    fn from(row: ProductRow) -> Self {
        DocumentRow::Product(row)
    }
}

impl From<Discount> for DocumentRow {
    fn from(row: Discount) -> Self {
        DocumentRow::Discount(row)
    }
}

open_string_enum! {
    /// How a payment was collected
    pub enum CollectType {
        Receipt => "Chitanta",
        TaxReceipt => "Bon fiscal",
        Cash => "Alta incasare numerar",
        PaymentOrder => "Ordin de plata",
        PostalOrder => "Mandat postal",
        Card => "Card",
        Check => "CEC",
        PromissoryNote => "Bilet ordin",
        Bank => "Alta incasare banca",
    }
}

/// Payment recorded against a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collect {
    #[serde(rename = "type")]
    pub kind: CollectType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub document_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Date::is_zero")]
    pub issue_date: Date,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mentions: String,
}

/// Existing document a new one refers to, e.g. the proforma an invoice settles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub series_name: String,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub number: i64,
}

/// Summary of an issued document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub series_name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "einvoice")]
    pub e_invoice: String,
    #[serde(default)]
    pub total: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collects: Vec<Collect>,
}

impl Document {
    /// Document id, taken from the `id` query parameter of its link.
    ///
    /// Returns `None` when the document has no link or the link has no id.
    pub fn id(&self) -> Result<Option<String>> {
        if self.link.is_empty() {
            return Ok(None);
        }

        let url = Url::parse(&self.link)?;
        Ok(url
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned()))
    }
}

/// Invoice as returned by the list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub draft: Bool,
    #[serde(default)]
    pub canceled: Bool,
    #[serde(default)]
    pub collected: Bool,
    #[serde(default)]
    pub series_name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub issue_date: Date,
    #[serde(default)]
    pub due_date: Date,
    #[serde(default)]
    pub precision: Int,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub exchange_rate: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub issuer_id: String,
    #[serde(default)]
    pub notice_number: String,
    #[serde(default)]
    pub deputy_name: String,
    #[serde(default)]
    pub deputy_identity_card: String,
    #[serde(default)]
    pub deputy_auto: String,
    #[serde(default)]
    pub mentions: String,
    #[serde(default)]
    pub use_stock: Bool,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "einvoice")]
    pub e_invoice: String,
    #[serde(default)]
    pub client: Client,
    #[serde(default)]
    pub products: Vec<Product>,
}
