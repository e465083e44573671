//! Student record model
//!
//! A student is stored as a flat document of text fields, exactly as the form
//! produced them. Reading is lenient: numbers written by other clients are
//! accepted and turned into their decimal text form.

use crate::config;
use crate::error::{AppError, Result};
use crate::storage::{Document, Fields};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editable fields of a student record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFields {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub class: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub section: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub roll_number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub guardian_name: String,
    /// Date of birth, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_text")]
    pub dob: String,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_text")]
    pub admission_date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub grade: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub extra_notes: String,
}

/// A persisted student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(flatten)]
    pub fields: StudentFields,
}

/// One row of the students table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub class: String,
    pub section: String,
    pub roll_number: String,
}

/// Names a single field of [`StudentFields`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudentField {
    Name,
    Class,
    Section,
    RollNumber,
    Address,
    Phone,
    Email,
    GuardianName,
    Dob,
    AdmissionDate,
    Grade,
    ExtraNotes,
}

impl StudentField {
    /// Every field in form order
    pub const ALL: [StudentField; 12] = [
        StudentField::Name,
        StudentField::Class,
        StudentField::Section,
        StudentField::RollNumber,
        StudentField::Address,
        StudentField::Phone,
        StudentField::Email,
        StudentField::GuardianName,
        StudentField::Dob,
        StudentField::AdmissionDate,
        StudentField::Grade,
        StudentField::ExtraNotes,
    ];

    /// Document key of the field
    pub fn as_str(self) -> &'static str {
        match self {
            StudentField::Name => "name",
            StudentField::Class => "class",
            StudentField::Section => "section",
            StudentField::RollNumber => "rollNumber",
            StudentField::Address => "address",
            StudentField::Phone => "phone",
            StudentField::Email => "email",
            StudentField::GuardianName => "guardianName",
            StudentField::Dob => "dob",
            StudentField::AdmissionDate => "admissionDate",
            StudentField::Grade => "grade",
            StudentField::ExtraNotes => "extraNotes",
        }
    }

    /// Form label
    pub fn label(self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::Class => "Class",
            StudentField::Section => "Section",
            StudentField::RollNumber => "Roll Number",
            StudentField::Address => "Address",
            StudentField::Phone => "Phone",
            StudentField::Email => "Email",
            StudentField::GuardianName => "Guardian Name",
            StudentField::Dob => "Date of Birth",
            StudentField::AdmissionDate => "Admission Date",
            StudentField::Grade => "Grade",
            StudentField::ExtraNotes => "Extra Notes",
        }
    }
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        StudentField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| AppError::Generic(format!("Unknown student field: {}", s)))
    }
}

impl StudentFields {
    /// Blank template used for a new record
    pub fn blank() -> Self {
        Self::default()
    }

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
            StudentField::ExtraNotes => &self.extra_notes,
        }
    }

    fn slot(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::Name => &mut self.name,
            StudentField::Class => &mut self.class,
            StudentField::Section => &mut self.section,
            StudentField::RollNumber => &mut self.roll_number,
            StudentField::Address => &mut self.address,
            StudentField::Phone => &mut self.phone,
            StudentField::Email => &mut self.email,
            StudentField::GuardianName => &mut self.guardian_name,
            StudentField::Dob => &mut self.dob,
            StudentField::AdmissionDate => &mut self.admission_date,
            StudentField::Grade => &mut self.grade,
            StudentField::ExtraNotes => &mut self.extra_notes,
        }
    }

    /// Store a value exactly as given
    pub fn set(&mut self, field: StudentField, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    /// Store a value typed into the form.
    ///
    /// Numeric class input above the highest class is clamped to it.
    pub fn apply_input(&mut self, field: StudentField, value: impl Into<String>) {
        let mut value = value.into();

        if field == StudentField::Class {
            if let Ok(number) = value.trim().parse::<f64>() {
                if number > f64::from(config::MAX_CLASS) {
                    value = config::MAX_CLASS.to_string();
                }
            }
        }

        self.set(field, value);
    }

    /// Convert to the field map sent to a document store
    pub fn to_document_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(AppError::Generic(format!(
                "Student fields serialized to a non-object value: {}",
                other
            ))),
        }
    }

    /// Read fields from a stored document, ignoring unknown keys
    pub fn from_document_fields(fields: &Fields) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(
            fields.clone(),
        ))?)
    }
}

impl Student {
    pub fn from_document(document: &Document) -> Result<Self> {
        Ok(Self {
            id: document.id.clone(),
            fields: StudentFields::from_document_fields(&document.fields)?,
        })
    }

    pub fn row(&self) -> StudentRow {
        StudentRow {
            id: self.id.clone(),
            name: self.fields.name.clone(),
            class: self.fields.class.clone(),
            section: self.fields.section.clone(),
            roll_number: self.fields.roll_number.clone(),
        }
    }
}

/// Accept text, numbers, booleans or null and keep the text form
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => number_text(&n),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Whole-valued doubles read as integers (`12.0` -> `"12"`)
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut fields = StudentFields::blank();
        fields.roll_number = "7".to_string();
        fields.guardian_name = "Jane Doe".to_string();

        let map = fields.to_document_fields().unwrap();

        assert_eq!(map.len(), 12);
        assert_eq!(map["rollNumber"], "7");
        assert_eq!(map["guardianName"], "Jane Doe");
        assert_eq!(map["admissionDate"], "");
        assert!(map.contains_key("extraNotes"));
    }

    #[test]
    fn test_numbers_read_as_text() {
        let map = json!({ "name": "Asha", "class": 9, "rollNumber": 42, "extraNotes": null })
            .as_object()
            .cloned()
            .unwrap();

        let fields = StudentFields::from_document_fields(&map).unwrap();

        assert_eq!(fields.name, "Asha");
        assert_eq!(fields.class, "9");
        assert_eq!(fields.roll_number, "42");
        assert_eq!(fields.extra_notes, "");
        assert_eq!(fields.phone, "");
    }

    #[test]
    fn test_whole_doubles_read_as_integers() {
        let map = json!({ "class": 12.0, "rollNumber": 7.5, "phone": 9876543210.0 })
            .as_object()
            .cloned()
            .unwrap();

        let fields = StudentFields::from_document_fields(&map).unwrap();

        assert_eq!(fields.class, "12");
        assert_eq!(fields.roll_number, "7.5");
        assert_eq!(fields.phone, "9876543210");
    }

    #[test]
    fn test_student_json_flattens_id() {
        let student = Student {
            id: "s1".to_string(),
            fields: StudentFields {
                name: "Ravi".to_string(),
                ..StudentFields::blank()
            },
        };

        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["id"], "s1");
        assert_eq!(value["name"], "Ravi");

        let back: Student = serde_json::from_value(value).unwrap();
        assert_eq!(back, student);
    }

    #[test]
    fn test_class_input_is_clamped() {
        let mut fields = StudentFields::blank();

        fields.apply_input(StudentField::Class, "15");
        assert_eq!(fields.class, "12");

        fields.apply_input(StudentField::Class, "11");
        assert_eq!(fields.class, "11");

        fields.apply_input(StudentField::Class, "abc");
        assert_eq!(fields.class, "abc");

        // Other fields are never clamped
        fields.apply_input(StudentField::RollNumber, "99");
        assert_eq!(fields.roll_number, "99");
    }

    #[test]
    fn test_field_names_parse() {
        for field in StudentField::ALL {
            assert_eq!(field.as_str().parse::<StudentField>().unwrap(), field);
        }
        assert!("age".parse::<StudentField>().is_err());
    }

    #[test]
    fn test_row_projection() {
        let student = Student {
            id: "abc".to_string(),
            fields: StudentFields {
                name: "Meera".to_string(),
                class: "5".to_string(),
                section: "B".to_string(),
                roll_number: "12".to_string(),
                phone: "1234567890".to_string(),
                ..StudentFields::blank()
            },
        };

        let row = student.row();
        assert_eq!(row.id, "abc");
        assert_eq!(row.section, "B");
        assert_eq!(row.roll_number, "12");
    }
}
