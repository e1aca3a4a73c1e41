//! # jobly-db
//!
//! Data-access layer for the jobly companies/jobs schema on PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: [`build_set_clause`] turns a sparse [`FieldMap`] into a
//!   `"col"=$1, "other"=$2` SET clause plus the aligned parameter list
//! - **Filters**: [`build_filter_clause`] renders substring / minimum / maximum predicates
//!   with deterministic placeholder numbering
//! - **Repositories**: [`CompanyRepository`] and [`JobRepository`] implement CRUD on top of the
//!   builders against any [`GenericClient`]
//! - **No value interpolation**: only trusted column identifiers appear in SQL text
//!
//! ## Example
//!
//! ```ignore
//! use jobly_db::{CompanyRepository, FieldMap};
//!
//! let pool = jobly_db::create_pool(&jobly_db::DbConfig::from_env()?)?;
//! let client = pool.get().await?;
//! let companies = CompanyRepository::new(&client);
//!
//! let small = companies
//!     .filter(&FieldMap::new().with("nameLike", "net").with("maxEmployees", 50))
//!     .await?;
//!
//! let renamed = companies
//!     .update("c1", &FieldMap::new().with("name", "C One").with("numEmployees", 12))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod filter;
pub mod ident;
pub mod models;
pub mod row;
pub mod update;
pub mod validate;
pub mod value;

pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{ErrorKind, JoblyError, JoblyResult};
pub use fields::{FieldMap, NameMapping};
pub use filter::{FilterKey, FilterSchema, FilterSpec, build_filter_clause, build_filter_clause_from};
pub use models::company::{
    COMPANY_COLUMNS, COMPANY_FILTERS, Company, CompanyDetail, CompanyRepository, NewCompany,
};
pub use models::job::{JOB_COLUMNS, JOB_FILTERS, Job, JobRepository, JobSummary, NewJob};
pub use row::{FromRow, RowExt};
pub use update::{SqlFragment, build_set_clause};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;

#[cfg(feature = "tracing")]
pub mod monitor;

#[cfg(feature = "tracing")]
pub use monitor::TracingClient;
