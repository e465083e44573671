//! Integration tests for Rollcall
//!
//! These tests drive the console end to end over a file-backed database:
//! - Exactly which store calls each flow makes
//! - Session gating and sign-out reset
//! - Settings and database files on disk

use async_trait::async_trait;
use rollcall::app::AppState;
use rollcall::auth::{LocalAuthProvider, SessionHandle};
use rollcall::database::{create_pool, Repository};
use rollcall::error::{AppError, Result};
use rollcall::services::{AppSettings, ConsoleMode, StudentsConsole, StudentsService, SubmitOutcome};
use rollcall::storage::{Document, DocumentStore, Fields, LocalStore};
use rollcall::student::{StudentField, StudentFields};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ListAll,
    Create(Fields),
    Update(String, Fields),
    Delete(String),
}

/// Store wrapper that remembers every call it forwards
struct RecordingStore {
    inner: LocalStore,
    calls: Mutex<Vec<Call>>,
}

impl RecordingStore {
    fn new(inner: LocalStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn writes(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call != Call::ListAll)
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.record(Call::ListAll);
        self.inner.list_all(collection).await
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        self.record(Call::Create(fields.clone()));
        self.inner.create(collection, fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.record(Call::Update(id.to_string(), fields.clone()));
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.record(Call::Delete(id.to_string()));
        self.inner.delete(collection, id).await
    }
}

/// Helper to create a file-backed repository
async fn create_test_repo() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let pool = create_pool(&db_path).await.unwrap();
    (Repository::new(pool), temp_dir)
}

async fn create_test_console() -> (StudentsConsole, Arc<RecordingStore>, TempDir) {
    let (repo, temp) = create_test_repo().await;
    let store = Arc::new(RecordingStore::new(LocalStore::new(repo)));
    let service = StudentsService::new(store.clone(), "students");

    (StudentsConsole::new(service), store, temp)
}

fn valid_fields(name: &str) -> StudentFields {
    let mut fields = StudentFields::blank();
    for (field, value) in [
        (StudentField::Name, name),
        (StudentField::Class, "7"),
        (StudentField::Section, "B"),
        (StudentField::RollNumber, "12"),
        (StudentField::Address, "9 Harbour Road"),
        (StudentField::Phone, "9876543210"),
        (StudentField::Email, "pupil@example.com"),
        (StudentField::GuardianName, "Ravi Kumar"),
        (StudentField::Dob, "2011-03-04"),
        (StudentField::AdmissionDate, "2016-07-01"),
        (StudentField::Grade, "A"),
        (StudentField::ExtraNotes, "Plays chess"),
    ] {
        fields.set(field, value);
    }
    fields
}

fn fill_draft(console: &mut StudentsConsole, fields: &StudentFields) {
    for field in StudentField::ALL {
        console.set_field(field, fields.get(field)).unwrap();
    }
}

async fn add(console: &mut StudentsConsole, fields: &StudentFields) -> String {
    console.begin_add();
    fill_draft(console, fields);
    match console.submit().await.unwrap() {
        SubmitOutcome::Saved { id } => id,
        other => panic!("expected save, got {:?}", other),
    }
}

#[tokio::test]
async fn test_add_creates_exactly_once_with_submitted_fields() {
    let (mut console, store, _temp) = create_test_console().await;
    console.reload().await.unwrap();

    let fields = valid_fields("Asha Kumar");
    let id = add(&mut console, &fields).await;

    assert_eq!(
        store.writes(),
        vec![Call::Create(fields.to_document_fields().unwrap())]
    );
    assert_eq!(console.students().len(), 1);
    assert_eq!(console.students()[0].id, id);
    assert_eq!(console.students()[0].fields, fields);
}

#[tokio::test]
async fn test_edit_sends_full_record_under_original_id() {
    let (mut console, store, _temp) = create_test_console().await;
    console.reload().await.unwrap();

    let original = valid_fields("Asha Kumar");
    let id = add(&mut console, &original).await;
    store.clear();

    console.begin_edit(&id).unwrap();
    console.set_field(StudentField::Class, "9").unwrap();
    let outcome = console.submit().await.unwrap();

    let mut expected = original.clone();
    expected.set(StudentField::Class, "9");

    assert_eq!(outcome, SubmitOutcome::Saved { id: id.clone() });
    assert_eq!(
        store.writes(),
        vec![Call::Update(id.clone(), expected.to_document_fields().unwrap())]
    );
    assert_eq!(console.students().len(), 1);
    assert_eq!(console.students()[0].fields.class, "9");
    assert_eq!(console.students()[0].fields.name, "Asha Kumar");
}

#[tokio::test]
async fn test_delete_removes_only_that_student() {
    let (mut console, store, _temp) = create_test_console().await;
    console.reload().await.unwrap();

    let first = add(&mut console, &valid_fields("Asha Kumar")).await;
    let second = add(&mut console, &valid_fields("Bela Roy")).await;
    store.clear();

    console.delete(&first).await.unwrap();

    assert_eq!(store.writes(), vec![Call::Delete(first.clone())]);
    let ids: Vec<&str> = console.students().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![second.as_str()]);
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_store() {
    let (mut console, store, _temp) = create_test_console().await;
    console.reload().await.unwrap();

    let mut fields = valid_fields("Asha Kumar");
    fields.set(StudentField::Phone, "12345");

    console.begin_add();
    fill_draft(&mut console, &fields);
    let outcome = console.submit().await.unwrap();

    match outcome {
        SubmitOutcome::Rejected { errors } => {
            assert!(!errors.phone.is_empty());
            assert!(errors.name.is_empty());
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(store.writes().is_empty());
    assert!(matches!(console.mode(), ConsoleMode::Drafting { .. }));
}

#[tokio::test]
async fn test_cancelled_draft_makes_no_calls() {
    let (mut console, store, _temp) = create_test_console().await;
    console.reload().await.unwrap();
    store.clear();

    console.begin_add();
    fill_draft(&mut console, &valid_fields("Asha Kumar"));
    console.cancel_draft();

    assert!(store.calls.lock().unwrap().is_empty());
    assert_eq!(console.mode(), &ConsoleMode::Idle);
}

async fn create_test_state() -> (AppState, TempDir) {
    let (repo, temp) = create_test_repo().await;
    let accounts = LocalAuthProvider::new(repo.clone());

    let state = AppState::from_parts(
        temp.path().to_path_buf(),
        AppSettings::default(),
        Arc::new(accounts.clone()),
        Arc::new(LocalStore::new(repo)),
        SessionHandle::default(),
        Some(accounts),
    );

    state
        .create_first_account("office@school.test", "front-desk-pass")
        .await
        .unwrap();

    (state, temp)
}

#[tokio::test]
async fn test_failed_sign_in_keeps_console_locked() {
    let (state, _temp) = create_test_state().await;

    let result = state.sign_in("office@school.test", "wrong-password").await;

    assert!(matches!(result, Err(AppError::Auth(_))));
    assert!(!state.session.is_signed_in().await);
    assert!(matches!(state.console().await, Err(AppError::NotAuthenticated)));
}

#[tokio::test]
async fn test_sign_out_discards_console_state() {
    let (state, _temp) = create_test_state().await;
    state
        .sign_in("office@school.test", "front-desk-pass")
        .await
        .unwrap();

    {
        let mut console = state.console().await.unwrap();
        console.reload().await.unwrap();
        add(&mut console, &valid_fields("Asha Kumar")).await;
        console.begin_add();
    }

    state.sign_out().await.unwrap();
    assert!(matches!(state.console().await, Err(AppError::NotAuthenticated)));

    state
        .sign_in("office@school.test", "front-desk-pass")
        .await
        .unwrap();
    let mut console = state.console().await.unwrap();

    assert!(console.students().is_empty());
    assert_eq!(console.mode(), &ConsoleMode::Idle);

    // Records themselves survive the session
    console.reload().await.unwrap();
    assert_eq!(console.students().len(), 1);
}

#[tokio::test]
async fn test_students_persist_across_restart() {
    let temp = TempDir::new().unwrap();

    {
        let state = AppState::initialize(temp.path().to_path_buf()).await.unwrap();
        state
            .create_first_account("office@school.test", "front-desk-pass")
            .await
            .unwrap();
        state
            .sign_in("office@school.test", "front-desk-pass")
            .await
            .unwrap();

        let mut console = state.console().await.unwrap();
        console.reload().await.unwrap();
        add(&mut console, &valid_fields("Asha Kumar")).await;
    }

    let state = AppState::initialize(temp.path().to_path_buf()).await.unwrap();
    assert!(!state.needs_bootstrap().await.unwrap());
    assert!(temp.path().join("settings.json").exists());

    state
        .sign_in("office@school.test", "front-desk-pass")
        .await
        .unwrap();
    let mut console = state.console().await.unwrap();
    console.reload().await.unwrap();

    assert_eq!(console.students().len(), 1);
    assert_eq!(console.students()[0].fields.name, "Asha Kumar");
}
