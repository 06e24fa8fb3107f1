//! Payment gateway callback decoding and the payment context carried across
//! the gateway redirect.
//!
//! The gateway returns to us in one of two shapes:
//!
//! * structured query fields (`responseCode`, `transactionStatus`, `amount`,
//!   `orderInfo`, `txnRef`, optionally `vnp_`-prefixed), where a response
//!   code of `"00"` means success;
//! * a legacy `state` parameter holding URL-encoded JSON
//!   `{"success": bool, "packageDetails": {...}}`.
//!
//! Both are parsed by pure functions into the same [`GatewayOutcome`].

use crate::domain::ids::{DesignerId, PackageId, RequestId};
use crate::domain::money::GatewayAmount;
use crate::error::{MarketError, Result};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use url::Url;
use uuid::Uuid;

/// Response code the gateway uses for a successful payment.
pub const SUCCESS_CODE: &str = "00";

/// Session record name the pending pick is stored under before redirecting.
pub const SESSION_KEY: &str = "paymentPackageDetails";

const RESPONSE_CODE: &[&str] = &["responseCode", "vnp_ResponseCode"];
const TRANSACTION_STATUS: &[&str] = &["transactionStatus", "vnp_TransactionStatus"];
const AMOUNT: &[&str] = &["amount", "vnp_Amount"];
const ORDER_INFO: &[&str] = &["orderInfo", "vnp_OrderInfo"];
const TXN_REF: &[&str] = &["txnRef", "vnp_TxnRef"];
const STATE: &[&str] = &["state"];

/// Which designer, package and request a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageDetails {
    #[serde(alias = "designerId", deserialize_with = "id_or_ref")]
    pub designer: DesignerId,
    #[serde(alias = "packageId", deserialize_with = "id_or_ref")]
    pub package: PackageId,
    #[serde(
        alias = "designRequestId",
        alias = "requestId",
        deserialize_with = "id_or_ref"
    )]
    pub request: RequestId,
}

// Accepts a bare id or an embedded object carrying an `id` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrRef {
    Id(Uuid),
    Ref { id: Uuid },
}

fn id_or_ref<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<Uuid>,
{
    match IdOrRef::deserialize(deserializer)? {
        IdOrRef::Id(id) | IdOrRef::Ref { id } => Ok(T::from(id)),
    }
}

/// Gateway transaction fields, when the structured shape was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub response_code: String,
    pub transaction_status: Option<String>,
    /// Serialized as the display amount (minor units / 100).
    #[serde(serialize_with = "display_amount")]
    pub amount: Option<GatewayAmount>,
    pub txn_ref: Option<String>,
    pub order_info: Option<String>,
}

fn display_amount<S: Serializer>(
    amount: &Option<GatewayAmount>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    amount.map(GatewayAmount::display_amount).serialize(serializer)
}

/// A decoded callback, whichever shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOutcome {
    pub success: bool,
    pub package_details: Option<PackageDetails>,
    pub receipt: Option<PaymentReceipt>,
}

impl GatewayOutcome {
    pub fn response_code(&self) -> Option<&str> {
        self.receipt.as_ref().map(|r| r.response_code.as_str())
    }
}

#[derive(Deserialize)]
struct LegacyState {
    success: bool,
    #[serde(rename = "packageDetails", alias = "package_details", default)]
    package_details: Option<PackageDetails>,
}

/// Decodes a gateway return: a full return URL or just its query string.
pub fn decode_callback(input: &str) -> Result<GatewayOutcome> {
    let fields = parse_query(input)?;
    decode_fields(&fields)
}

/// Decodes already-split callback fields. Structured fields win over `state`.
pub fn decode_fields(fields: &HashMap<String, String>) -> Result<GatewayOutcome> {
    if let Some(outcome) = parse_structured(fields) {
        return outcome;
    }
    if let Some(outcome) = parse_legacy(fields) {
        return outcome;
    }
    Err(MarketError::MalformedCallback(
        "callback carries neither a response code nor a state parameter".to_string(),
    ))
}

pub fn parse_query(input: &str) -> Result<HashMap<String, String>> {
    let input = input.trim();
    let query = if input.contains("://") {
        let url = Url::parse(input)
            .map_err(|e| MarketError::MalformedCallback(format!("invalid return url: {e}")))?;
        url.query().unwrap_or_default().to_string()
    } else {
        input.trim_start_matches('?').to_string()
    };
    Ok(url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect())
}

fn field<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| fields.get(*name))
        .map(|value| value.trim())
}

fn parse_structured(fields: &HashMap<String, String>) -> Option<Result<GatewayOutcome>> {
    let code = field(fields, RESPONSE_CODE)?;
    Some(structured_outcome(code, fields))
}

fn structured_outcome(code: &str, fields: &HashMap<String, String>) -> Result<GatewayOutcome> {
    if code.is_empty() {
        return Err(MarketError::MalformedCallback(
            "empty response code".to_string(),
        ));
    }

    let amount = field(fields, AMOUNT)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<u64>()
                .map(GatewayAmount::from_minor_units)
                .map_err(|e| MarketError::MalformedCallback(format!("invalid amount {raw:?}: {e}")))
        })
        .transpose()?;

    let order_info = field(fields, ORDER_INFO).filter(|raw| !raw.is_empty());
    let package_details = order_info.and_then(decode_order_info);

    Ok(GatewayOutcome {
        success: code == SUCCESS_CODE,
        package_details,
        receipt: Some(PaymentReceipt {
            response_code: code.to_string(),
            transaction_status: field(fields, TRANSACTION_STATUS).map(str::to_string),
            amount,
            txn_ref: field(fields, TXN_REF).map(str::to_string),
            order_info: order_info.map(str::to_string),
        }),
    })
}

/// Order info is JSON when we generated it; free text otherwise.
fn decode_order_info(raw: &str) -> Option<PackageDetails> {
    decode_json::<PackageDetails>(raw).ok()
}

fn parse_legacy(fields: &HashMap<String, String>) -> Option<Result<GatewayOutcome>> {
    let state = field(fields, STATE)?;
    Some(
        decode_json::<LegacyState>(state)
            .map(|legacy| GatewayOutcome {
                success: legacy.success,
                package_details: legacy.package_details,
                receipt: None,
            })
            .map_err(|e| MarketError::MalformedCallback(format!("undecodable state: {e}"))),
    )
}

// The value may arrive percent-encoded once more on top of query decoding.
fn decode_json<T: for<'de> Deserialize<'de>>(raw: &str) -> std::result::Result<T, String> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(first) => {
            let decoded = percent_decode_str(raw)
                .decode_utf8()
                .map_err(|e| e.to_string())?;
            if decoded == raw {
                return Err(first.to_string());
            }
            serde_json::from_str(&decoded).map_err(|e| e.to_string())
        }
    }
}

/// The pending pick, carried from the redirect to the gateway until the
/// callback is confirmed.
///
/// Created on redirect, consumed once on a confirmed callback, never read
/// twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentContext {
    details: Option<PackageDetails>,
}

impl PaymentContext {
    pub fn on_redirect(details: PackageDetails) -> Self {
        Self {
            details: Some(details),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Restores the context from its session record (`{designer, package, request}`).
    pub fn from_session_record(record: &str) -> Result<Self> {
        Ok(Self::on_redirect(serde_json::from_str(record)?))
    }

    pub fn to_session_record(&self) -> Result<Option<String>> {
        self.details
            .as_ref()
            .map(|details| serde_json::to_string(details).map_err(MarketError::from))
            .transpose()
    }

    pub fn details(&self) -> Option<&PackageDetails> {
        self.details.as_ref()
    }

    pub fn consume(&mut self) -> Option<PackageDetails> {
        self.details.take()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_none()
    }
}

/// Picks the package details a confirmation should use.
///
/// Details decoded from the callback win; the stored context is the fallback.
/// When both exist they must agree.
pub fn resolve_details(
    decoded: Option<PackageDetails>,
    stored: Option<&PackageDetails>,
) -> Result<PackageDetails> {
    match (decoded, stored) {
        (Some(decoded), Some(stored)) if decoded != *stored => Err(MarketError::MalformedCallback(
            "callback order info does not match the pending pick".to_string(),
        )),
        (Some(decoded), _) => Ok(decoded),
        (None, Some(stored)) => Ok(*stored),
        (None, None) => Err(MarketError::MalformedCallback(
            "no package details in callback or payment context".to_string(),
        )),
    }
}
