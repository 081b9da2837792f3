//! Partial updates as a read-modify-write cycle
//!
//! Stores only know whole-record replacement. [`apply_patch`] reads the
//! current record, overwrites the fields present in the patch, re-validates
//! the result and writes it back. A delete racing with this cycle surfaces as
//! `EditConflict`; the caller decides whether to retry.

use super::error::{RepositoryError, RepositoryOperation};
use super::resource::{Patch, Resource};
use super::traits::{Repository, RepositoryResult};

/// Apply `patch` to the record with `id` and persist the result
///
/// # Errors
///
/// - `NotFound` when the record does not exist
/// - `ValidationFailed` when the patched record breaks a domain rule; nothing
///   is written in that case
/// - `EditConflict` when the record was deleted between the read and the write
pub async fn apply_patch<R, Repo, P>(repo: &Repo, id: i64, patch: P) -> RepositoryResult<R>
where
    R: Resource,
    Repo: Repository<R>,
    P: Patch<R>,
{
    let mut record = repo.get(id).await?;

    if patch.is_empty() {
        return Ok(record);
    }
    patch.apply_to(&mut record);

    record.check().map_err(|errors| {
        RepositoryError::validation_failed(RepositoryOperation::Update, errors)
            .with_entity(R::NAME, id.to_string())
    })?;

    repo.update(record).await
}
