//! Education competition: applications, admit cards and results.
//!
//! DESIGN
//! ======
//! Staff verify payments and assign roll numbers and exam slots directly in
//! the database. An applicant polls with their form number; the admit card
//! becomes available only once every step is done. The progression is
//! evaluated by [`AdmitCardStatus::evaluate`], which is pure.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::services::forms::{FormError, Required, optional, present};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationInput {
    pub applicant_name: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub class: Option<String>,
    pub address: Option<String>,
    pub mobile_number: Option<String>,
    pub aadhaar_number: Option<String>,
    pub institute_name: Option<String>,
    pub photo_url: Option<String>,
    pub aadhaar_front_url: Option<String>,
    pub aadhaar_back_url: Option<String>,
    pub payment_screenshot_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub applicant_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub class: String,
    pub address: String,
    pub mobile_number: String,
    pub aadhaar_number: String,
    pub institute_name: Option<String>,
    pub photo_url: String,
    pub aadhaar_front_url: String,
    pub aadhaar_back_url: String,
    pub payment_screenshot_url: String,
}

impl ApplicationInput {
    /// # Errors
    ///
    /// `MissingFields` naming each blank required field.
    pub fn validate(self) -> Result<NewApplication, FormError> {
        let mut r = Required::default();
        let applicant_name = r.field("applicant_name", self.applicant_name.as_deref());
        let father_name = r.field("father_name", self.father_name.as_deref());
        let mother_name = r.field("mother_name", self.mother_name.as_deref());
        let date_of_birth = r.field("date_of_birth", self.date_of_birth.as_deref());
        let gender = r.field("gender", self.gender.as_deref());
        let class = r.field("class", self.class.as_deref());
        let address = r.field("address", self.address.as_deref());
        let mobile_number = r.field("mobile_number", self.mobile_number.as_deref());
        let aadhaar_number = r.field("aadhaar_number", self.aadhaar_number.as_deref());
        let photo_url = r.field("photo_url", self.photo_url.as_deref());
        let aadhaar_front_url = r.field("aadhaar_front_url", self.aadhaar_front_url.as_deref());
        let aadhaar_back_url = r.field("aadhaar_back_url", self.aadhaar_back_url.as_deref());
        let payment_screenshot_url = r.field("payment_screenshot_url", self.payment_screenshot_url.as_deref());
        r.finish()?;

        Ok(NewApplication {
            applicant_name: applicant_name.to_owned(),
            father_name: father_name.to_owned(),
            mother_name: mother_name.to_owned(),
            date_of_birth: date_of_birth.to_owned(),
            gender: gender.to_owned(),
            class: class.to_owned(),
            address: address.to_owned(),
            mobile_number: mobile_number.to_owned(),
            aadhaar_number: aadhaar_number.to_owned(),
            institute_name: optional(self.institute_name.as_deref()),
            photo_url: photo_url.to_owned(),
            aadhaar_front_url: aadhaar_front_url.to_owned(),
            aadhaar_back_url: aadhaar_back_url.to_owned(),
            payment_screenshot_url: payment_screenshot_url.to_owned(),
        })
    }
}

/// Application columns the admit-card check reads.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct AdmitCardRecord {
    pub form_no: String,
    pub applicant_name: String,
    pub father_name: String,
    pub date_of_birth: String,
    pub photo_url: String,
    pub class: String,
    pub payment_verified: Option<bool>,
    pub roll_number: Option<String>,
    pub exam_date: Option<String>,
    pub exam_time: Option<String>,
    pub exam_centre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmitCard {
    pub form_no: String,
    pub applicant_name: String,
    pub father_name: String,
    pub date_of_birth: String,
    pub photo_url: String,
    pub class: String,
    pub roll_number: String,
    pub exam_date: String,
    pub exam_time: String,
    pub exam_centre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdmitCardStatus {
    NotFound,
    PaymentPending,
    RollNumberPending,
    Preparing { missing: Vec<&'static str> },
    Ready { admit_card: AdmitCard },
}

impl AdmitCardStatus {
    /// Walk the steps in order: payment, roll number, exam slot.
    #[must_use]
    pub fn evaluate(record: Option<AdmitCardRecord>) -> Self {
        let Some(record) = record else {
            return Self::NotFound;
        };
        if !record.payment_verified.unwrap_or(false) {
            return Self::PaymentPending;
        }
        let Some(roll_number) = present(record.roll_number.as_deref()).map(str::to_owned) else {
            return Self::RollNumberPending;
        };

        let slot = [
            ("exam date", present(record.exam_date.as_deref())),
            ("exam time", present(record.exam_time.as_deref())),
            ("exam centre", present(record.exam_centre.as_deref())),
        ];
        let missing: Vec<&'static str> = slot
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(label, _)| *label)
            .collect();
        if !missing.is_empty() {
            return Self::Preparing { missing };
        }
        let [exam_date, exam_time, exam_centre] = slot.map(|(_, value)| value.unwrap_or_default().to_owned());

        Self::Ready {
            admit_card: AdmitCard {
                form_no: record.form_no,
                applicant_name: record.applicant_name,
                father_name: record.father_name,
                date_of_birth: record.date_of_birth,
                photo_url: record.photo_url,
                class: record.class,
                roll_number,
                exam_date,
                exam_time,
                exam_centre,
            },
        }
    }

    /// Applicant-facing status line.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotFound => "No application found for this form number.".to_owned(),
            Self::PaymentPending => "Your payment is pending verification. Please check back later.".to_owned(),
            Self::RollNumberPending => {
                "Application received. Roll number not assigned yet. Please check back later.".to_owned()
            }
            Self::Preparing { missing } => format!(
                "Your admit card is being prepared. Missing: {}. Please check back later.",
                missing.join(", ")
            ),
            Self::Ready { .. } => "Your admit card is ready for download.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ExamResult {
    pub name: String,
    pub mark: String,
}

// =============================================================================
// QUERIES
// =============================================================================

/// Store an application; the database assigns the form number.
///
/// # Errors
///
/// Validation errors, or a database error.
pub async fn submit_application(pool: &PgPool, input: ApplicationInput) -> Result<String, FormError> {
    let app = input.validate()?;

    let form_no = sqlx::query_scalar::<_, String>(
        r"INSERT INTO competition_applications
              (applicant_name, father_name, mother_name, date_of_birth, gender, class, address,
               mobile_number, aadhaar_number, institute_name, photo_url, aadhaar_front_url,
               aadhaar_back_url, payment_screenshot_url)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
          RETURNING form_no",
    )
    .bind(&app.applicant_name)
    .bind(&app.father_name)
    .bind(&app.mother_name)
    .bind(&app.date_of_birth)
    .bind(&app.gender)
    .bind(&app.class)
    .bind(&app.address)
    .bind(&app.mobile_number)
    .bind(&app.aadhaar_number)
    .bind(&app.institute_name)
    .bind(&app.photo_url)
    .bind(&app.aadhaar_front_url)
    .bind(&app.aadhaar_back_url)
    .bind(&app.payment_screenshot_url)
    .fetch_one(pool)
    .await?;

    tracing::info!(%form_no, class = %app.class, "competition application submitted");
    Ok(form_no)
}

/// Admit-card status for a form number.
///
/// # Errors
///
/// `MissingFields` for a blank form number, or a database error.
pub async fn lookup_admit_card(pool: &PgPool, form_no: &str) -> Result<AdmitCardStatus, FormError> {
    let form_no = present(Some(form_no)).ok_or_else(|| FormError::MissingFields(vec!["form_no"]))?;

    let record = sqlx::query_as::<_, AdmitCardRecord>(
        r"SELECT form_no, applicant_name, father_name, date_of_birth, photo_url, class,
                 payment_verified, roll_number, exam_date, exam_time, exam_centre
          FROM competition_applications WHERE form_no = $1",
    )
    .bind(form_no)
    .fetch_optional(pool)
    .await?;

    let status = AdmitCardStatus::evaluate(record);
    tracing::debug!(form_no, ?status, "admit card lookup");
    Ok(status)
}

/// First result row for a roll number.
///
/// # Errors
///
/// `MissingFields` for a blank roll number, `NotFound` when no row matches.
pub async fn lookup_result(pool: &PgPool, roll_number: &str) -> Result<ExamResult, FormError> {
    let roll_number = present(Some(roll_number)).ok_or_else(|| FormError::MissingFields(vec!["roll_number"]))?;

    sqlx::query_as::<_, ExamResult>(
        "SELECT name, mark FROM exam_results WHERE roll_number = $1 ORDER BY created_at ASC LIMIT 1",
    )
    .bind(roll_number)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FormError::NotFound("No result found for this roll number.".to_owned()))
}

#[cfg(test)]
#[path = "competition_test.rs"]
mod tests;
