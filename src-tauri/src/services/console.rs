//! Students console
//!
//! The listing/editing surface as a state machine over one focal draft:
//!
//! ```text
//! Idle --begin_add--> Drafting(Creating)      --submit ok--> Idle + reload
//! Idle --begin_edit--> Drafting(Editing(id))  --submit ok--> Idle + reload
//! Drafting --set_field / submit rejected--> Drafting
//! Idle --view--> Viewing --close_view--> Idle
//! Idle --delete--> Idle + reload
//! ```
//!
//! Every successful write is followed by a full reload, so the listing is
//! the store's latest snapshot. A failed store call leaves the mode and
//! listing as they were; a write that succeeds is reported as such even if
//! the reload after it fails.

use crate::error::{AppError, Result};
use crate::services::StudentsService;
use crate::student::{Student, StudentField, StudentFields, StudentRow};
use crate::validation::FieldErrors;
use serde::Serialize;

/// What a draft will be written as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DraftTarget {
    Creating,
    Editing { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ConsoleMode {
    #[default]
    Idle,
    Drafting {
        target: DraftTarget,
        draft: StudentFields,
        errors: FieldErrors,
    },
    Viewing {
        student: Student,
    },
}

/// Result of submitting the open draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// Written to the store; the console is idle again
    Saved { id: String },
    /// Validation failed; the draft stays open with its errors
    Rejected { errors: FieldErrors },
}

/// Snapshot handed to the frontend
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleView {
    pub rows: Vec<StudentRow>,
    pub mode: ConsoleMode,
}

pub struct StudentsConsole {
    students: StudentsService,
    listing: Vec<Student>,
    mode: ConsoleMode,
}

impl StudentsConsole {
    pub fn new(students: StudentsService) -> Self {
        Self {
            students,
            listing: Vec::new(),
            mode: ConsoleMode::Idle,
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.listing
    }

    pub fn mode(&self) -> &ConsoleMode {
        &self.mode
    }

    pub fn view(&self) -> ConsoleView {
        ConsoleView {
            rows: self.listing.iter().map(Student::row).collect(),
            mode: self.mode.clone(),
        }
    }

    /// Replace the listing with the store's current contents
    pub async fn reload(&mut self) -> Result<()> {
        self.listing = self.students.list_students().await?;
        Ok(())
    }

    /// Discard listing and any open draft or view
    pub fn reset(&mut self) {
        self.listing.clear();
        self.mode = ConsoleMode::Idle;
    }

    fn find(&self, id: &str) -> Result<&Student> {
        self.listing
            .iter()
            .find(|student| student.id == id)
            .ok_or_else(|| AppError::StudentNotFound(id.to_string()))
    }

    /// Open a blank draft for a new student
    pub fn begin_add(&mut self) {
        self.mode = ConsoleMode::Drafting {
            target: DraftTarget::Creating,
            draft: StudentFields::blank(),
            errors: FieldErrors::default(),
        };
    }

    /// Open a draft holding a copy of an existing student
    pub fn begin_edit(&mut self, id: &str) -> Result<()> {
        let student = self.find(id)?.clone();

        self.mode = ConsoleMode::Drafting {
            target: DraftTarget::Editing { id: student.id },
            draft: student.fields,
            errors: FieldErrors::default(),
        };
        Ok(())
    }

    /// Change one field of the open draft
    pub fn set_field(&mut self, field: StudentField, value: impl Into<String>) -> Result<()> {
        match &mut self.mode {
            ConsoleMode::Drafting { draft, .. } => {
                draft.apply_input(field, value);
                Ok(())
            }
            _ => Err(AppError::InvalidState("No draft is open".to_string())),
        }
    }

    /// Close the draft without saving
    pub fn cancel_draft(&mut self) {
        if matches!(self.mode, ConsoleMode::Drafting { .. }) {
            self.mode = ConsoleMode::Idle;
        }
    }

    /// Validate the draft and, if it passes, write it and reload
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let ConsoleMode::Drafting { target, draft, .. } = &self.mode else {
            return Err(AppError::InvalidState("No draft is open".to_string()));
        };

        let saved = match target {
            DraftTarget::Creating => self.students.create_student(draft.clone()).await,
            DraftTarget::Editing { id } => self.students.update_student(id, draft.clone()).await,
        };

        match saved {
            Ok(student) => {
                self.mode = ConsoleMode::Idle;
                self.reload_after_write(&student.id).await;
                Ok(SubmitOutcome::Saved { id: student.id })
            }
            Err(AppError::Validation(rejected)) => {
                if let ConsoleMode::Drafting { errors, .. } = &mut self.mode {
                    *errors = rejected.clone();
                }
                Ok(SubmitOutcome::Rejected { errors: rejected })
            }
            Err(e) => Err(e),
        }
    }

    /// Show a read-only copy of a student
    pub fn open_view(&mut self, id: &str) -> Result<()> {
        let student = self.find(id)?.clone();
        self.mode = ConsoleMode::Viewing { student };
        Ok(())
    }

    pub fn close_view(&mut self) -> Result<()> {
        match self.mode {
            ConsoleMode::Viewing { .. } => {
                self.mode = ConsoleMode::Idle;
                Ok(())
            }
            _ => Err(AppError::InvalidState("No student is being viewed".to_string())),
        }
    }

    /// Delete a listed student and reload
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.find(id)?;
        self.students.delete_student(id).await?;
        self.reload_after_write(id).await;
        Ok(())
    }

    /// Reload after a write that already succeeded.
    ///
    /// A failed reload does not undo the write; the listing stays as it was
    /// until the next successful reload.
    async fn reload_after_write(&mut self, id: &str) {
        if let Err(e) = self.reload().await {
            tracing::warn!("Wrote student {} but reloading the listing failed: {}", id, e);
        }
    }
}
