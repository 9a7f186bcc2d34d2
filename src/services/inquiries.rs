//! Business inquiries ("free website" form).
//!
//! The form carries a handful of business questions that have no column of
//! their own. They are folded into `additional_info` so the row keeps the
//! table's fixed shape.

use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::forms::{FormError, Required, optional};

/// Form answers stored in `additional_info` rather than their own columns.
const EXTRA_FIELDS: [&str; 5] = [
    "website_type",
    "does_delivery",
    "can_deliver_outside_imphal",
    "can_deliver_within_city",
    "established_year",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InquiryInput {
    pub event_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub address: Option<String>,
    pub business_name: Option<String>,
    pub business_product_or_service: Option<String>,
    pub how_did_you_hear: Option<String>,
    pub has_domain: Option<String>,
    pub website_type: Option<String>,
    pub does_delivery: Option<String>,
    pub can_deliver_outside_imphal: Option<String>,
    pub can_deliver_within_city: Option<String>,
    pub established_year: Option<String>,
    pub additional_info: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInquiry {
    pub event_id: String,
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub address: Option<String>,
    pub business_name: Option<String>,
    pub business_product_or_service: Option<String>,
    pub how_did_you_hear: Option<String>,
    pub has_domain: Option<String>,
    pub user_id: Option<Uuid>,
    pub additional_info: Option<Value>,
}

impl InquiryInput {
    fn extras(&self) -> [Option<&str>; 5] {
        [
            self.website_type.as_deref(),
            self.does_delivery.as_deref(),
            self.can_deliver_outside_imphal.as_deref(),
            self.can_deliver_within_city.as_deref(),
            self.established_year.as_deref(),
        ]
    }

    /// Merge the extra answers into `additional_info`. A non-object
    /// `additional_info` is kept under the `"notes"` key.
    fn folded_additional_info(&self) -> Option<Value> {
        let mut info = match &self.additional_info {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(other) => Map::from_iter([("notes".to_owned(), other.clone())]),
        };
        for (key, value) in EXTRA_FIELDS.iter().zip(self.extras()) {
            if let Some(value) = optional(value) {
                info.insert((*key).to_owned(), Value::String(value));
            }
        }
        if info.is_empty() { None } else { Some(Value::Object(info)) }
    }

    /// Check required fields and shape the row.
    ///
    /// # Errors
    ///
    /// `MissingFields` when any of `full_name`, `email`, `message`,
    /// `event_id` is blank.
    pub fn validate(self, user_id: Option<Uuid>) -> Result<NewInquiry, FormError> {
        let additional_info = self.folded_additional_info();

        let mut required = Required::default();
        let full_name = required.field("full_name", self.full_name.as_deref());
        let email = required.field("email", self.email.as_deref());
        let message = required.field("message", self.message.as_deref());
        let event_id = required.field("event_id", self.event_id.as_deref());
        required.finish()?;

        Ok(NewInquiry {
            event_id: event_id.to_owned(),
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            message: message.to_owned(),
            phone: optional(self.phone.as_deref()),
            organization: optional(self.organization.as_deref()),
            address: optional(self.address.as_deref()),
            business_name: optional(self.business_name.as_deref()),
            business_product_or_service: optional(self.business_product_or_service.as_deref()),
            how_did_you_hear: optional(self.how_did_you_hear.as_deref()),
            has_domain: optional(self.has_domain.as_deref()),
            user_id,
            additional_info,
        })
    }
}

/// Validate and store one inquiry.
///
/// # Errors
///
/// Validation errors from [`InquiryInput::validate`], or a database error.
pub async fn submit_inquiry(pool: &PgPool, input: InquiryInput, user_id: Option<Uuid>) -> Result<Uuid, FormError> {
    let inquiry = input.validate(user_id)?;

    let id = sqlx::query_scalar::<_, Uuid>(
        r"INSERT INTO inquiries
              (event_id, full_name, email, message, phone, organization, address, business_name,
               business_product_or_service, how_did_you_hear, has_domain, user_id, additional_info)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
          RETURNING id",
    )
    .bind(&inquiry.event_id)
    .bind(&inquiry.full_name)
    .bind(&inquiry.email)
    .bind(&inquiry.message)
    .bind(&inquiry.phone)
    .bind(&inquiry.organization)
    .bind(&inquiry.address)
    .bind(&inquiry.business_name)
    .bind(&inquiry.business_product_or_service)
    .bind(&inquiry.how_did_you_hear)
    .bind(&inquiry.has_domain)
    .bind(inquiry.user_id)
    .bind(&inquiry.additional_info)
    .fetch_one(pool)
    .await?;

    tracing::info!(inquiry_id = %id, event_id = %inquiry.event_id, "inquiry submitted");
    Ok(id)
}

#[cfg(test)]
#[path = "inquiries_test.rs"]
mod tests;
