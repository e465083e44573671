//! Student record validation
//!
//! `validate` maps a draft to a message per field. Every field is checked
//! independently; a record is acceptable only when every message is empty.
//! The admission date is the one cross-field rule: it is measured against the
//! date of birth.

use crate::config;
use crate::student::{StudentField, StudentFields};
use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static PERSON_NAME: LazyLock<Regex> = LazyLock::new(|| compile(config::PERSON_NAME_PATTERN));
static CLASS: LazyLock<Regex> = LazyLock::new(|| compile(config::CLASS_PATTERN));
static SECTION: LazyLock<Regex> = LazyLock::new(|| compile(config::SECTION_PATTERN));
static ROLL_NUMBER: LazyLock<Regex> = LazyLock::new(|| compile(config::ROLL_NUMBER_PATTERN));
static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(config::PHONE_PATTERN));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(config::EMAIL_PATTERN));
static GRADE: LazyLock<Regex> = LazyLock::new(|| compile(config::GRADE_PATTERN));

// Patterns are constants; a typo fails every test in this module.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("field pattern must compile")
}

pub const NAME_MESSAGE: &str = "Name must only contain characters.";
pub const CLASS_MESSAGE: &str = "Class must be between 1 and 12.";
pub const SECTION_MESSAGE: &str = "Section must be A, B, C, D, or E.";
pub const ROLL_NUMBER_MESSAGE: &str = "Roll number must be between 1 and 100.";
pub const ADDRESS_MESSAGE: &str = "Address must not exceed 100 characters.";
pub const PHONE_MESSAGE: &str = "Phone number must be exactly 10 digits.";
pub const EMAIL_MESSAGE: &str = "Invalid email format.";
pub const GUARDIAN_NAME_MESSAGE: &str = "Guardian name must only contain characters.";
pub const DOB_MESSAGE: &str = "Date of Birth is required.";
pub const ADMISSION_DATE_MESSAGE: &str =
    "Admission date must be at least 4 years after Date of Birth and not exceed today.";
pub const GRADE_MESSAGE: &str = "Grade must be A, B, C, D, E, or F.";

/// Per-field validation messages; an empty string means the field passed.
///
/// Extra notes are unconstrained and therefore have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub name: String,
    pub class: String,
    pub section: String,
    pub roll_number: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub guardian_name: String,
    pub dob: String,
    pub admission_date: String,
    pub grade: String,
}

impl FieldErrors {
    /// True when every message is empty
    pub fn is_valid(&self) -> bool {
        self.messages().next().is_none()
    }

    /// Message for one field (always empty for extra notes)
    pub fn get(&self, field: StudentField) -> &str {
        match field {
            StudentField::Name => &self.name,
            StudentField::Class => &self.class,
            StudentField::Section => &self.section,
            StudentField::RollNumber => &self.roll_number,
            StudentField::Address => &self.address,
            StudentField::Phone => &self.phone,
            StudentField::Email => &self.email,
            StudentField::GuardianName => &self.guardian_name,
            StudentField::Dob => &self.dob,
            StudentField::AdmissionDate => &self.admission_date,
            StudentField::Grade => &self.grade,
            StudentField::ExtraNotes => "",
        }
    }

    /// Failing fields with their messages, in form order
    pub fn messages(&self) -> impl Iterator<Item = (StudentField, &str)> + '_ {
        StudentField::ALL
            .into_iter()
            .map(|field| (field, self.get(field)))
            .filter(|(_, message)| !message.is_empty())
    }
}

/// Validate a draft against today's (UTC) date
pub fn validate(fields: &StudentFields) -> FieldErrors {
    validate_on(fields, Utc::now().date_naive())
}

/// Validate a draft against an explicit "today"
pub fn validate_on(fields: &StudentFields, today: NaiveDate) -> FieldErrors {
    FieldErrors {
        name: check(PERSON_NAME.is_match(&fields.name), NAME_MESSAGE),
        class: check(CLASS.is_match(&fields.class), CLASS_MESSAGE),
        section: check(SECTION.is_match(&fields.section), SECTION_MESSAGE),
        roll_number: check(ROLL_NUMBER.is_match(&fields.roll_number), ROLL_NUMBER_MESSAGE),
        address: check(
            fields.address.chars().count() <= config::MAX_ADDRESS_LENGTH,
            ADDRESS_MESSAGE,
        ),
        phone: check(PHONE.is_match(&fields.phone), PHONE_MESSAGE),
        email: check(EMAIL.is_match(&fields.email), EMAIL_MESSAGE),
        guardian_name: check(
            PERSON_NAME.is_match(&fields.guardian_name),
            GUARDIAN_NAME_MESSAGE,
        ),
        dob: check(!fields.dob.is_empty(), DOB_MESSAGE),
        admission_date: check(
            admission_date_ok(&fields.dob, &fields.admission_date, today),
            ADMISSION_DATE_MESSAGE,
        ),
        grade: check(GRADE.is_match(&fields.grade), GRADE_MESSAGE),
    }
}

/// Whether `value` has the basic `local@domain.tld` shape
pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

fn check(passed: bool, message: &str) -> String {
    if passed {
        String::new()
    } else {
        message.to_string()
    }
}

fn admission_date_ok(dob: &str, admission_date: &str, today: NaiveDate) -> bool {
    let (Some(dob), Some(admitted)) = (parse_date(dob), parse_date(admission_date)) else {
        return false;
    };

    match add_years(dob, config::MIN_ADMISSION_AGE_YEARS) {
        Some(earliest) => admitted >= earliest && admitted <= today,
        None => false,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), config::DATE_FORMAT).ok()
}

/// Same month and day `years` later; 29 February rolls to 1 March when the
/// target year has no leap day.
fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month() + 1, 1))
}
