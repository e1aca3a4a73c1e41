//! Jobs: records and repository.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fields::{FieldMap, NameMapping};
use crate::filter::FilterSchema;
use crate::models::check_updatable;
use crate::row::{FromRow, RowExt, map_rows};
use crate::update::build_set_clause;
use crate::validate;
use crate::value::Value;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const JOB_COLUMNS: NameMapping = NameMapping::new(&[("companyHandle", "company_handle")]);

/// `title` searches the title; `minSalary` / `maxSalary` bound the salary.
pub const JOB_FILTERS: FilterSchema = FilterSchema {
    contains_key: "title",
    contains_column: "title",
    min_key: "minSalary",
    max_key: "maxSalary",
    bound_column: "salary",
};

/// Fields a partial update may touch. `id` and `companyHandle` are fixed at creation.
pub const JOB_UPDATABLE: &[&str] = &["title", "salary", "equity"];

const SELECT_JOBS: &str = "SELECT id, title, salary, equity, company_handle
       FROM jobs";

const RETURNING_JOB: &str = "RETURNING id, title, salary, equity, company_handle";

/// A job row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

/// Input for [`JobRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[serde(alias = "company_handle")]
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> JoblyResult<()> {
        validate::non_empty("title", &self.title)?;
        validate::non_empty("companyHandle", &self.company_handle)?;
        if let Some(salary) = self.salary {
            validate::non_negative("salary", i64::from(salary))?;
        }
        if let Some(equity) = self.equity {
            validate::fraction("equity", equity)?;
        }
        Ok(())
    }
}

fn normalize_update(data: &FieldMap) -> JoblyResult<FieldMap> {
    check_updatable(data, JOB_UPDATABLE)?;

    let mut normalized = FieldMap::new();
    for (field, value) in data.iter() {
        let value = match (field, value) {
            ("salary" | "equity", Value::Null) => Value::Null,
            ("title", v) => {
                let title = validate::text(field, v)?;
                validate::non_empty(field, title)?;
                v.clone()
            }
            ("salary", v) => {
                let salary = validate::integer(field, v)?;
                validate::non_negative(field, i64::from(salary))?;
                Value::from(salary)
            }
            ("equity", v) => {
                let equity = validate::decimal(field, v)?;
                validate::fraction(field, equity)?;
                Value::Decimal(equity)
            }
            _ => return Err(JoblyError::validation(format!("{field} cannot be updated"))),
        };
        normalized.insert(field, value);
    }
    Ok(normalized)
}

/// CRUD access to the `jobs` table.
pub struct JobRepository<C> {
    db: C,
}

impl<C: GenericClient> JobRepository<C> {
    pub fn new(db: C) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying executor.
    pub fn client(&self) -> &C {
        &self.db
    }

    /// Insert a job and return it with its generated id.
    ///
    /// A negative salary or an equity outside `[0, 1]` fails with [`JoblyError::Validation`].
    /// An unknown company handle surfaces as the database's foreign key error.
    pub async fn create(&self, data: &NewJob) -> JoblyResult<Job> {
        data.validate()?;

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             {RETURNING_JOB}"
        );
        let row = self
            .db
            .query_one_tagged(
                "jobs.create",
                &sql,
                &[&data.title, &data.salary, &data.equity, &data.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// All jobs ordered by title.
    pub async fn find_all(&self) -> JoblyResult<Vec<Job>> {
        let sql = format!("{SELECT_JOBS} ORDER BY title, id");
        let rows = self.db.query_tagged("jobs.find_all", &sql, &[]).await?;
        map_rows(&rows)
    }

    /// Jobs posted by one company, ordered by title.
    pub async fn find_by_company(&self, company_handle: &str) -> JoblyResult<Vec<Job>> {
        let sql = format!("{SELECT_JOBS} WHERE company_handle = $1 ORDER BY title, id");
        let rows = self
            .db
            .query_tagged("jobs.find_by_company", &sql, &[&company_handle])
            .await?;
        map_rows(&rows)
    }

    /// A single job by id.
    pub async fn get(&self, id: i32) -> JoblyResult<Job> {
        let sql = format!("{SELECT_JOBS} WHERE id = $1");
        let row = self
            .db
            .query_opt_tagged("jobs.get", &sql, &[&id])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    /// Jobs matching `criteria` (`title`, `minSalary`, `maxSalary`), ordered by title.
    ///
    /// Empty criteria return every job; no match is an empty list, not an error.
    pub async fn filter(&self, criteria: &FieldMap) -> JoblyResult<Vec<Job>> {
        let filter = JOB_FILTERS.build(criteria)?;
        if filter.is_empty() {
            return self.find_all().await;
        }

        let sql = format!("{SELECT_JOBS} WHERE {} ORDER BY title, id", filter.sql);
        let rows = self
            .db
            .query_tagged("jobs.filter", &sql, &filter.params_ref())
            .await?;
        map_rows(&rows)
    }

    /// Partially update a job: only the supplied fields change.
    ///
    /// Accepts `title`, `salary` and `equity`; `null` clears salary or equity.
    pub async fn update(&self, id: i32, data: &FieldMap) -> JoblyResult<Job> {
        let normalized = normalize_update(data)?;
        let set = build_set_clause(&normalized, &JOB_COLUMNS)?;

        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} {RETURNING_JOB}",
            set.sql,
            set.next_placeholder()
        );
        let mut params = set.params_ref();
        params.push(&id);

        let row = self
            .db
            .query_opt_tagged("jobs.update", &sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    /// Delete a job.
    pub async fn remove(&self, id: i32) -> JoblyResult<()> {
        self.db
            .query_opt_tagged(
                "jobs.remove",
                "DELETE FROM jobs WHERE id = $1 RETURNING id",
                &[&id],
            )
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Ok(())
    }
}
