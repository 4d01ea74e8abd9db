//! Company and department repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use folio_core::{
    Company, CompanyId, Department, DepartmentId, Error, OrganizationRepository, Result,
};

use crate::decode_id;

/// PostgreSQL implementation of OrganizationRepository.
#[derive(Clone)]
pub struct PgOrganizationRepository {
    pool: Pool<Postgres>,
}

impl PgOrganizationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_company(r: &PgRow) -> Result<Company> {
    let status: String = r.get("status");
    Ok(Company {
        id: decode_id(r, "id")?,
        name: r.get("name"),
        status: status.parse()?,
    })
}

fn map_department(r: &PgRow) -> Result<Department> {
    let status: String = r.get("status");
    Ok(Department {
        id: decode_id(r, "id")?,
        company_id: decode_id(r, "company_id")?,
        name: r.get("name"),
        status: status.parse()?,
    })
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    async fn create_company(&self, name: &str) -> Result<Company> {
        let row = sqlx::query("INSERT INTO company (name) VALUES ($1) RETURNING id, name, status")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        map_company(&row)
    }

    async fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
        let row = sqlx::query("SELECT id, name, status FROM company WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(map_company).transpose()
    }

    async fn create_department(&self, company_id: CompanyId, name: &str) -> Result<Department> {
        let row = sqlx::query(
            r#"
            INSERT INTO department (company_id, name)
            SELECT c.id, $2 FROM company c WHERE c.id = $1
            RETURNING id, company_id, name, status
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => map_department(&r),
            None => Err(Error::NotFound(format!("company {}", company_id))),
        }
    }

    async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
        let row = sqlx::query("SELECT id, company_id, name, status FROM department WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(map_department).transpose()
    }

    async fn list_departments(&self, company_id: CompanyId) -> Result<Vec<Department>> {
        let rows = sqlx::query(
            "SELECT id, company_id, name, status FROM department
             WHERE company_id = $1 ORDER BY id",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(map_department).collect()
    }
}
