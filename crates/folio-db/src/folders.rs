//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use folio_core::{
    CompanyId, DepartmentId, Error, Folder, FolderId, FolderRepository, NewFolder, Result,
};

use crate::decode_id;

/// PostgreSQL implementation of FolderRepository.
#[derive(Clone)]
pub struct PgFolderRepository {
    pool: Pool<Postgres>,
}

impl PgFolderRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_folder(r: &PgRow) -> Result<Folder> {
    Ok(Folder {
        id: decode_id(r, "id")?,
        company_id: decode_id(r, "company_id")?,
        department_id: decode_id(r, "department_id")?,
        name: r.get("name"),
        active: r.get("active"),
    })
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn get_folder(&self, id: FolderId) -> Result<Option<Folder>> {
        let row = sqlx::query(
            "SELECT id, company_id, department_id, name, active
             FROM folder WHERE id = $1 AND active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_folder).transpose()
    }

    async fn create_folder(&self, folder: NewFolder) -> Result<Folder> {
        // Inserting through a SELECT on department keeps the ownership check
        // and the insert in one statement.
        let row = sqlx::query(
            r#"
            INSERT INTO folder (company_id, department_id, name)
            SELECT d.company_id, d.id, $3
            FROM department d
            WHERE d.id = $2 AND d.company_id = $1
            RETURNING id, company_id, department_id, name, active
            "#,
        )
        .bind(folder.company_id)
        .bind(folder.department_id)
        .bind(&folder.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => map_folder(&r),
            None => Err(Error::InvalidInput(format!(
                "department {} does not belong to company {}",
                folder.department_id, folder.company_id
            ))),
        }
    }

    async fn list_folders(
        &self,
        company_id: CompanyId,
        department_id: DepartmentId,
    ) -> Result<Vec<Folder>> {
        let rows = sqlx::query(
            "SELECT id, company_id, department_id, name, active
             FROM folder
             WHERE company_id = $1 AND department_id = $2 AND active
             ORDER BY name, id",
        )
        .bind(company_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(map_folder).collect()
    }

    async fn deactivate_folder(&self, id: FolderId) -> Result<()> {
        let result = sqlx::query("UPDATE folder SET active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("folder {}", id)));
        }
        Ok(())
    }
}
