//! Companies: records and repository.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fields::{FieldMap, NameMapping};
use crate::filter::FilterSchema;
use crate::models::check_updatable;
use crate::models::job::JobSummary;
use crate::row::{FromRow, RowExt, map_rows};
use crate::update::build_set_clause;
use crate::validate;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// External field names that differ from their column.
pub const COMPANY_COLUMNS: NameMapping =
    NameMapping::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

/// `nameLike` searches the name; `minEmployees` / `maxEmployees` bound the head count.
pub const COMPANY_FILTERS: FilterSchema = FilterSchema {
    contains_key: "nameLike",
    contains_column: "name",
    min_key: "minEmployees",
    max_key: "maxEmployees",
    bound_column: "num_employees",
};

/// Fields a partial update may touch. The handle is the identity and never changes.
pub const COMPANY_UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

const SELECT_COMPANIES: &str = "SELECT handle, name, description, num_employees, logo_url
       FROM companies";

/// Unique constraint on `companies.name`.
const NAME_CONSTRAINT: &str = "companies_name_key";

const RETURNING_COMPANY: &str = "RETURNING handle, name, description, num_employees, logo_url";

/// A company row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Input for [`CompanyRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> JoblyResult<()> {
        validate::non_empty("handle", &self.handle)?;
        validate::non_empty("name", &self.name)?;
        if let Some(n) = self.num_employees {
            validate::non_negative("numEmployees", i64::from(n))?;
        }
        if let Some(url) = &self.logo_url {
            validate::url("logoUrl", url)?;
        }
        Ok(())
    }
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

/// Check the values of a company update and normalize them for binding.
fn normalize_update(data: &FieldMap) -> JoblyResult<FieldMap> {
    check_updatable(data, COMPANY_UPDATABLE)?;

    let mut normalized = FieldMap::new();
    for (field, value) in data.iter() {
        let value = match (field, value) {
            ("numEmployees" | "logoUrl", Value::Null) => Value::Null,
            ("name", v) => {
                let name = validate::text(field, v)?;
                validate::non_empty(field, name)?;
                v.clone()
            }
            ("description", v) => Value::from(validate::text(field, v)?),
            ("numEmployees", v) => {
                let n = validate::integer(field, v)?;
                validate::non_negative(field, i64::from(n))?;
                Value::from(n)
            }
            ("logoUrl", v) => {
                let url = validate::text(field, v)?;
                validate::url(field, url)?;
                v.clone()
            }
            _ => return Err(JoblyError::validation(format!("{field} cannot be updated"))),
        };
        normalized.insert(field, value);
    }
    Ok(normalized)
}

/// CRUD access to the `companies` table.
pub struct CompanyRepository<C> {
    db: C,
}

impl<C: GenericClient> CompanyRepository<C> {
    pub fn new(db: C) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying executor.
    pub fn client(&self) -> &C {
        &self.db
    }

    /// Insert a company and return the stored row.
    ///
    /// Fails with [`JoblyError::Duplicate`] if the handle is taken and
    /// [`JoblyError::Validation`] if a field breaks a domain rule.
    pub async fn create(&self, data: &NewCompany) -> JoblyResult<Company> {
        data.validate()?;

        let existing = self
            .db
            .query_opt_tagged(
                "companies.create.check",
                "SELECT handle FROM companies WHERE handle = $1",
                &[&data.handle],
            )
            .await?;
        if existing.is_some() {
            return Err(JoblyError::duplicate(format!("company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             {RETURNING_COMPANY}"
        );
        let row = self
            .db
            .query_one_tagged(
                "companies.create",
                &sql,
                &[
                    &data.handle,
                    &data.name,
                    &data.description,
                    &data.num_employees,
                    &data.logo_url,
                ],
            )
            .await
            .map_err(|e| match e {
                JoblyError::UniqueViolation { constraint, .. } if constraint == NAME_CONSTRAINT => {
                    JoblyError::duplicate(format!("company name: {}", data.name))
                }
                // Lost a race with a concurrent insert of the same handle.
                JoblyError::UniqueViolation { .. } => {
                    JoblyError::duplicate(format!("company: {}", data.handle))
                }
                other => other,
            })?;
        Company::from_row(&row)
    }

    /// All companies ordered by name.
    pub async fn find_all(&self) -> JoblyResult<Vec<Company>> {
        let sql = format!("{SELECT_COMPANIES} ORDER BY name");
        let rows = self.db.query_tagged("companies.find_all", &sql, &[]).await?;
        map_rows(&rows)
    }

    /// A single company by handle.
    pub async fn get(&self, handle: &str) -> JoblyResult<Company> {
        let sql = format!("{SELECT_COMPANIES} WHERE handle = $1");
        let row = self
            .db
            .query_opt_tagged("companies.get", &sql, &[&handle])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Company::from_row(&row)
    }

    /// A company with all of its jobs (ordered by id), in one round trip.
    pub async fn get_with_jobs(&self, handle: &str) -> JoblyResult<CompanyDetail> {
        let rows = self
            .db
            .query_tagged(
                "companies.get_with_jobs",
                "SELECT c.handle, c.name, c.description, c.num_employees, c.logo_url,
                        j.id AS job_id, j.title AS job_title,
                        j.salary AS job_salary, j.equity AS job_equity
                   FROM companies AS c
                   LEFT JOIN jobs AS j ON j.company_handle = c.handle
                  WHERE c.handle = $1
                  ORDER BY j.id",
                &[&handle],
            )
            .await?;

        let first = rows
            .first()
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        let company = Company::from_row(first)?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in &rows {
            // A company without jobs comes back as one row of NULL job columns.
            let Some(id) = row.try_get_column::<Option<i32>>("job_id")? else {
                continue;
            };
            jobs.push(JobSummary {
                id,
                title: row.try_get_column("job_title")?,
                salary: row.try_get_column("job_salary")?,
                equity: row.try_get_column("job_equity")?,
            });
        }

        Ok(CompanyDetail { company, jobs })
    }

    /// Companies matching `criteria` (`nameLike`, `minEmployees`, `maxEmployees`), ordered by name.
    ///
    /// Empty criteria return every company; no match is an empty list, not an error.
    pub async fn filter(&self, criteria: &FieldMap) -> JoblyResult<Vec<Company>> {
        let filter = COMPANY_FILTERS.build(criteria)?;
        if filter.is_empty() {
            return self.find_all().await;
        }

        let sql = format!("{SELECT_COMPANIES} WHERE {} ORDER BY name", filter.sql);
        let rows = self
            .db
            .query_tagged("companies.filter", &sql, &filter.params_ref())
            .await?;
        map_rows(&rows)
    }

    /// Partially update a company: only the supplied fields change.
    ///
    /// Accepts `name`, `description`, `numEmployees` and `logoUrl`.
    pub async fn update(&self, handle: &str, data: &FieldMap) -> JoblyResult<Company> {
        let normalized = normalize_update(data)?;
        let set = build_set_clause(&normalized, &COMPANY_COLUMNS)?;

        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} {RETURNING_COMPANY}",
            set.sql,
            set.next_placeholder()
        );
        let mut params = set.params_ref();
        params.push(&handle);

        let row = self
            .db
            .query_opt_tagged("companies.update", &sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Company::from_row(&row)
    }

    /// Delete a company (its jobs go with it).
    pub async fn remove(&self, handle: &str) -> JoblyResult<()> {
        self.db
            .query_opt_tagged(
                "companies.remove",
                "DELETE FROM companies WHERE handle = $1 RETURNING handle",
                &[&handle],
            )
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Ok(())
    }
}
