//! In-memory entity store for deterministic testing.
//!
//! Implements every repository trait over plain maps and records each call
//! so tests can assert which store operations ran (or that none did).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = MemoryStore::new();
//! let company = store.seed_company(1, "Acme");
//! store.seed_department(2, company, "Finance");
//! let service = PlacementService::from_store(Arc::new(store.clone()));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::ids::{CompanyId, DepartmentId, DocumentId, FolderId};
use crate::models::*;
use crate::traits::{DocumentRepository, FolderRepository, OrganizationRepository, WriteOutcome};

/// A recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetDocument(DocumentId),
    SetDocumentFolder(DocumentId, Option<FolderId>),
    InsertDocument(String),
    SoftDeleteDocument(DocumentId),
    ListDocuments,
    GetFolder(FolderId),
    CreateFolder(String),
    ListFolders,
    DeactivateFolder(FolderId),
    CreateCompany(String),
    GetCompany(CompanyId),
    CreateDepartment(String),
    GetDepartment(DepartmentId),
    ListDepartments,
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCall::SetDocumentFolder(..)
                | StoreCall::InsertDocument(_)
                | StoreCall::SoftDeleteDocument(_)
                | StoreCall::CreateFolder(_)
                | StoreCall::DeactivateFolder(_)
                | StoreCall::CreateCompany(_)
                | StoreCall::CreateDepartment(_)
        )
    }
}

#[derive(Default)]
struct Tables {
    companies: HashMap<CompanyId, Company>,
    departments: HashMap<DepartmentId, Department>,
    folders: HashMap<FolderId, Folder>,
    documents: HashMap<DocumentId, Document>,
}

/// Shared-state in-memory store. Clones see the same data.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    call_log: Arc<Mutex<Vec<StoreCall>>>,
    next_id: Arc<AtomicI64>,
    fail_writes: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Generated ids start at 100 000 so they never collide with seeded ones.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(100_000)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: StoreCall) {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn write_guard(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Internal("simulated storage failure".to_string()));
        }
        Ok(())
    }

    /// Make every subsequent write fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn clear_calls(&self) {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Number of recorded write calls.
    pub fn write_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_write()).count()
    }

    // ─── Seeding (not recorded) ───────────────────────────────────────────

    pub fn seed_company(&self, id: i64, name: &str) -> CompanyId {
        let id = CompanyId::new(id).expect("seed ids are positive");
        self.tables().companies.insert(
            id,
            Company {
                id,
                name: name.to_string(),
                status: OrgStatus::Active,
            },
        );
        id
    }

    pub fn seed_department(&self, id: i64, company_id: CompanyId, name: &str) -> DepartmentId {
        let id = DepartmentId::new(id).expect("seed ids are positive");
        self.tables().departments.insert(
            id,
            Department {
                id,
                company_id,
                name: name.to_string(),
                status: OrgStatus::Active,
            },
        );
        id
    }

    pub fn seed_folder(
        &self,
        id: i64,
        company_id: CompanyId,
        department_id: DepartmentId,
        name: &str,
    ) -> FolderId {
        let id = FolderId::new(id).expect("seed ids are positive");
        self.tables().folders.insert(
            id,
            Folder {
                id,
                company_id,
                department_id,
                name: name.to_string(),
                active: true,
            },
        );
        id
    }

    pub fn seed_document(
        &self,
        id: i64,
        company_id: CompanyId,
        department_id: DepartmentId,
        folder_id: Option<FolderId>,
        name: &str,
    ) -> DocumentId {
        let id = DocumentId::new(id).expect("seed ids are positive");
        let now = Utc::now();
        self.tables().documents.insert(
            id,
            Document {
                id,
                company_id,
                department_id,
                folder_id,
                name: name.to_string(),
                status: DocumentStatus::Active,
                size_bytes: 0,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn set_folder_active(&self, id: FolderId, active: bool) {
        if let Some(folder) = self.tables().folders.get_mut(&id) {
            folder.active = active;
        }
    }

    pub fn set_document_status(&self, id: DocumentId, status: DocumentStatus) {
        if let Some(doc) = self.tables().documents.get_mut(&id) {
            doc.status = status;
        }
    }

    /// Raw row, including deleted documents. Not recorded.
    pub fn document_snapshot(&self, id: DocumentId) -> Option<Document> {
        self.tables().documents.get(&id).cloned()
    }

    /// Bump a document's version as a concurrent writer would.
    pub fn touch_document(&self, id: DocumentId) {
        if let Some(doc) = self.tables().documents.get_mut(&id) {
            doc.updated_at = next_version(doc.updated_at);
        }
    }
}

/// A fresh timestamp strictly later than `previous`.
fn next_version(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        self.record(StoreCall::GetDocument(id));
        Ok(self
            .tables()
            .documents
            .get(&id)
            .filter(|d| !d.status.is_deleted())
            .cloned())
    }

    async fn set_document_folder(
        &self,
        id: DocumentId,
        folder_id: Option<FolderId>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<WriteOutcome> {
        self.record(StoreCall::SetDocumentFolder(id, folder_id));
        self.write_guard()?;

        let mut tables = self.tables();
        if let Some(fid) = folder_id {
            if !tables.folders.get(&fid).is_some_and(|f| f.active) {
                return Ok(WriteOutcome::Stale);
            }
        }
        match tables.documents.get_mut(&id) {
            Some(doc) if !doc.status.is_deleted() && doc.updated_at == expected_updated_at => {
                doc.folder_id = folder_id;
                doc.updated_at = next_version(doc.updated_at);
                Ok(WriteOutcome::Applied {
                    updated_at: doc.updated_at,
                })
            }
            _ => Ok(WriteOutcome::Stale),
        }
    }

    async fn insert_document(&self, new: NewDocument) -> Result<Document> {
        self.record(StoreCall::InsertDocument(new.name.clone()));
        self.write_guard()?;

        let id = DocumentId::new(self.allocate_id())
            .ok_or_else(|| Error::Internal("id sequence exhausted".to_string()))?;
        let now = Utc::now();
        let doc = Document {
            id,
            company_id: new.company_id,
            department_id: new.department_id,
            folder_id: new.folder_id,
            name: new.name,
            status: DocumentStatus::Active,
            size_bytes: new.size_bytes,
            created_at: now,
            updated_at: now,
        };
        self.tables().documents.insert(id, doc.clone());
        Ok(doc)
    }

    async fn soft_delete_document(
        &self,
        id: DocumentId,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<WriteOutcome> {
        self.record(StoreCall::SoftDeleteDocument(id));
        self.write_guard()?;

        match self.tables().documents.get_mut(&id) {
            Some(doc) if !doc.status.is_deleted() && doc.updated_at == expected_updated_at => {
                doc.status = DocumentStatus::Deleted;
                doc.updated_at = next_version(doc.updated_at);
                Ok(WriteOutcome::Applied {
                    updated_at: doc.updated_at,
                })
            }
            _ => Ok(WriteOutcome::Stale),
        }
    }

    async fn list_documents(&self, req: ListDocumentsRequest) -> Result<Vec<Document>> {
        self.record(StoreCall::ListDocuments);
        let tables = self.tables();
        let mut docs: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| !d.status.is_deleted())
            .filter(|d| match req.scope {
                DocumentScope::InFolder(fid) => d.folder_id == Some(fid),
                DocumentScope::Unfiled {
                    company_id,
                    department_id,
                } => {
                    d.folder_id.is_none()
                        && d.company_id == company_id
                        && d.department_id == department_id
                }
            })
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(docs
            .into_iter()
            .skip(req.offset.max(0) as usize)
            .take(req.limit.max(0) as usize)
            .collect())
    }
}

#[async_trait]
impl FolderRepository for MemoryStore {
    async fn get_folder(&self, id: FolderId) -> Result<Option<Folder>> {
        self.record(StoreCall::GetFolder(id));
        Ok(self.tables().folders.get(&id).filter(|f| f.active).cloned())
    }

    async fn create_folder(&self, new: NewFolder) -> Result<Folder> {
        self.record(StoreCall::CreateFolder(new.name.clone()));
        self.write_guard()?;

        let mut tables = self.tables();
        let owned = tables
            .departments
            .get(&new.department_id)
            .is_some_and(|d| d.company_id == new.company_id);
        if !owned {
            return Err(Error::InvalidInput(format!(
                "department {} does not belong to company {}",
                new.department_id, new.company_id
            )));
        }
        let id = FolderId::new(self.allocate_id())
            .ok_or_else(|| Error::Internal("id sequence exhausted".to_string()))?;
        let folder = Folder {
            id,
            company_id: new.company_id,
            department_id: new.department_id,
            name: new.name,
            active: true,
        };
        tables.folders.insert(id, folder.clone());
        Ok(folder)
    }

    async fn list_folders(
        &self,
        company_id: CompanyId,
        department_id: DepartmentId,
    ) -> Result<Vec<Folder>> {
        self.record(StoreCall::ListFolders);
        let mut folders: Vec<Folder> = self
            .tables()
            .folders
            .values()
            .filter(|f| f.active && f.company_id == company_id && f.department_id == department_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn deactivate_folder(&self, id: FolderId) -> Result<()> {
        self.record(StoreCall::DeactivateFolder(id));
        self.write_guard()?;
        match self.tables().folders.get_mut(&id) {
            Some(folder) => {
                folder.active = false;
                Ok(())
            }
            None => Err(Error::NotFound(format!("folder {}", id))),
        }
    }
}

#[async_trait]
impl OrganizationRepository for MemoryStore {
    async fn create_company(&self, name: &str) -> Result<Company> {
        self.record(StoreCall::CreateCompany(name.to_string()));
        self.write_guard()?;
        let id = CompanyId::new(self.allocate_id())
            .ok_or_else(|| Error::Internal("id sequence exhausted".to_string()))?;
        let company = Company {
            id,
            name: name.to_string(),
            status: OrgStatus::Active,
        };
        self.tables().companies.insert(id, company.clone());
        Ok(company)
    }

    async fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
        self.record(StoreCall::GetCompany(id));
        Ok(self.tables().companies.get(&id).cloned())
    }

    async fn create_department(&self, company_id: CompanyId, name: &str) -> Result<Department> {
        self.record(StoreCall::CreateDepartment(name.to_string()));
        self.write_guard()?;
        let mut tables = self.tables();
        if !tables.companies.contains_key(&company_id) {
            return Err(Error::NotFound(format!("company {}", company_id)));
        }
        let id = DepartmentId::new(self.allocate_id())
            .ok_or_else(|| Error::Internal("id sequence exhausted".to_string()))?;
        let department = Department {
            id,
            company_id,
            name: name.to_string(),
            status: OrgStatus::Active,
        };
        tables.departments.insert(id, department.clone());
        Ok(department)
    }

    async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
        self.record(StoreCall::GetDepartment(id));
        Ok(self.tables().departments.get(&id).cloned())
    }

    async fn list_departments(&self, company_id: CompanyId) -> Result<Vec<Department>> {
        self.record(StoreCall::ListDepartments);
        let mut departments: Vec<Department> = self
            .tables()
            .departments
            .values()
            .filter(|d| d.company_id == company_id)
            .cloned()
            .collect();
        departments.sort_by_key(|d| d.id);
        Ok(departments)
    }
}
