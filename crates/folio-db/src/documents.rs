//! Document repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use folio_core::{
    Document, DocumentId, DocumentRepository, DocumentScope, Error, ListDocumentsRequest,
    NewDocument, Result, WriteOutcome,
};

use crate::{decode_id, decode_opt_id};

const DOCUMENT_COLUMNS: &str = "id, company_id, department_id, folder_id, name, status, \
     size_bytes, created_at, updated_at";

/// PostgreSQL implementation of DocumentRepository.
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_document(r: &PgRow) -> Result<Document> {
    let status: String = r.get("status");
    Ok(Document {
        id: decode_id(r, "id")?,
        company_id: decode_id(r, "company_id")?,
        department_id: decode_id(r, "department_id")?,
        folder_id: decode_opt_id(r, "folder_id")?,
        name: r.get("name"),
        status: status.parse()?,
        size_bytes: r.get("size_bytes"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

fn write_outcome(row: Option<PgRow>) -> WriteOutcome {
    match row {
        Some(r) => WriteOutcome::Applied {
            updated_at: r.get("updated_at"),
        },
        None => WriteOutcome::Stale,
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM document WHERE id = $1 AND status <> 'deleted'",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_document).transpose()
    }

    async fn set_document_folder(
        &self,
        id: DocumentId,
        folder_id: Option<folio_core::FolderId>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<WriteOutcome> {
        // The folder check repeats inside the UPDATE so a folder deactivated
        // after validation cannot receive the document.
        let row = sqlx::query(
            r#"
            UPDATE document
            SET folder_id = $1,
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
            WHERE id = $2
              AND updated_at = $3
              AND status <> 'deleted'
              AND ($1::BIGINT IS NULL
                   OR EXISTS (SELECT 1 FROM folder f WHERE f.id = $1 AND f.active))
            RETURNING updated_at
            "#,
        )
        .bind(folder_id)
        .bind(id)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(write_outcome(row))
    }

    async fn insert_document(&self, doc: NewDocument) -> Result<Document> {
        let row = sqlx::query(&format!(
            "INSERT INTO document (company_id, department_id, folder_id, name, size_bytes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(doc.company_id)
        .bind(doc.department_id)
        .bind(doc.folder_id)
        .bind(&doc.name)
        .bind(doc.size_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_document(&row)
    }

    async fn soft_delete_document(
        &self,
        id: DocumentId,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<WriteOutcome> {
        let row = sqlx::query(
            r#"
            UPDATE document
            SET status = 'deleted',
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
            WHERE id = $1 AND updated_at = $2 AND status <> 'deleted'
            RETURNING updated_at
            "#,
        )
        .bind(id)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(write_outcome(row))
    }

    async fn list_documents(&self, req: ListDocumentsRequest) -> Result<Vec<Document>> {
        let rows = match req.scope {
            DocumentScope::InFolder(folder_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM document
                     WHERE folder_id = $1 AND status <> 'deleted'
                     ORDER BY updated_at DESC, id DESC
                     LIMIT $2 OFFSET $3",
                    DOCUMENT_COLUMNS
                ))
                .bind(folder_id)
                .bind(req.limit)
                .bind(req.offset)
                .fetch_all(&self.pool)
                .await
            }
            DocumentScope::Unfiled {
                company_id,
                department_id,
            } => {
                sqlx::query(&format!(
                    "SELECT {} FROM document
                     WHERE folder_id IS NULL AND company_id = $1 AND department_id = $2
                       AND status <> 'deleted'
                     ORDER BY updated_at DESC, id DESC
                     LIMIT $3 OFFSET $4",
                    DOCUMENT_COLUMNS
                ))
                .bind(company_id)
                .bind(department_id)
                .bind(req.limit)
                .bind(req.offset)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        tracing::trace!(
            subsystem = "database",
            component = "documents",
            result_count = rows.len(),
            "Listed documents"
        );
        rows.iter().map(map_document).collect()
    }
}
