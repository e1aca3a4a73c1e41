//! Entity records and their repositories.

pub mod company;
pub mod job;

use crate::error::{JoblyError, JoblyResult};
use crate::fields::FieldMap;

/// Reject update fields outside `allowed` before anything is sent to the database.
pub(crate) fn check_updatable(data: &FieldMap, allowed: &[&str]) -> JoblyResult<()> {
    match data.keys().find(|key| !allowed.contains(key)) {
        Some(key) => Err(JoblyError::validation(format!(
            "{key} cannot be updated; allowed: {}",
            allowed.join(", ")
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing;
