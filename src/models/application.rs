// src/models/application.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::{Validate, ValidationError};

/// Membership tiers offered on the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    Founder,
    Standard,
    Premium,
    Vip,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Founder => "founder",
            MembershipType::Standard => "standard",
            MembershipType::Premium => "premium",
            MembershipType::Vip => "vip",
        }
    }
}

/// Review states for a membership application.
pub const MEMBERSHIP_STATUSES: &[&str] = &["pending", "approved", "rejected"];

/// Review states for a job application (the candidate tracker pipeline).
pub const JOB_STATUSES: &[&str] = &[
    "pending",
    "reviewing",
    "accepted",
    "rejected",
    "offer_made",
    "hired",
];

fn validate_url(value: &str) -> Result<(), ValidationError> {
    url::Url::parse(value).map_err(|_| ValidationError::new("invalid_url"))?;
    Ok(())
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::new("invalid_date"))?;
    Ok(())
}

fn validate_selected_roles(roles: &Vec<String>) -> Result<(), ValidationError> {
    if roles.is_empty() {
        return Err(ValidationError::new("select_at_least_one_role"));
    }
    for role in roles {
        if role.is_empty() || role.len() > 200 {
            return Err(ValidationError::new("invalid_role_title"));
        }
    }
    Ok(())
}

/// DTO for submitting a membership application.
#[derive(Debug, Deserialize, Validate)]
pub struct MembershipApplicationRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50))]
    pub gender: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 1, max = 50))]
    pub telephone1: String,
    #[validate(length(max = 50))]
    pub telephone2: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = validate_url))]
    pub linkedin: Option<String>,
    #[validate(custom(function = validate_date))]
    pub date_of_birth: String,
    #[validate(length(min = 1, max = 100))]
    pub nationality: String,
    #[validate(length(min = 1, max = 200))]
    pub occupation: String,
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 500))]
    pub company_address: String,
    #[validate(length(max = 2000))]
    pub personal_interests: Option<String>,
    #[validate(length(max = 5000))]
    pub personal_biography: Option<String>,
    pub membership_type: MembershipType,
}

/// Represents the 'membership_applications' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MembershipApplication {
    pub id: i64,
    pub full_name: String,
    pub gender: String,
    pub address: String,
    pub country: String,
    pub telephone1: String,
    pub telephone2: Option<String>,
    pub email: String,
    pub linkedin: Option<String>,
    pub date_of_birth: String,
    pub nationality: String,
    pub occupation: String,
    pub company_name: String,
    pub company_address: String,
    pub personal_interests: Option<String>,
    pub personal_biography: Option<String>,
    pub membership_type: String,
    pub status: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a job application. File upload is handled elsewhere;
/// the form only carries the resulting URLs.
#[derive(Debug, Deserialize, Validate)]
pub struct JobApplicationRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[validate(custom(function = validate_url))]
    pub linkedin: Option<String>,
    #[validate(length(max = 200))]
    pub current_position: Option<String>,
    #[validate(length(max = 200))]
    pub current_company: Option<String>,
    #[validate(custom(function = validate_url))]
    pub cv_url: Option<String>,
    #[validate(custom(function = validate_url))]
    pub photo_url: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub motivation: String,
    #[validate(custom(function = validate_selected_roles))]
    pub selected_roles: Vec<String>,
}

/// Represents the 'job_applications' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobApplication {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: Option<String>,
    pub current_position: Option<String>,
    pub current_company: Option<String>,
    pub cv_url: Option<String>,
    pub photo_url: Option<String>,
    pub motivation: String,
    pub selected_roles: Json<Vec<String>>,
    pub notes: Option<String>,
    pub status: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_request() -> JobApplicationRequest {
        JobApplicationRequest {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            linkedin: None,
            current_position: None,
            current_company: None,
            cv_url: None,
            photo_url: None,
            motivation: "I want to build something lasting.".to_string(),
            selected_roles: vec!["Membership Manager".to_string()],
        }
    }

    #[test]
    fn job_application_validates() {
        assert!(job_request().validate().is_ok());
    }

    #[test]
    fn job_application_requires_a_role() {
        let mut req = job_request();
        req.selected_roles.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn job_application_rejects_bad_linkedin() {
        let mut req = job_request();
        req.linkedin = Some("not a url".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn membership_date_of_birth_must_be_iso() {
        assert!(validate_date("1985-04-12").is_ok());
        assert!(validate_date("12/04/1985").is_err());
    }
}
