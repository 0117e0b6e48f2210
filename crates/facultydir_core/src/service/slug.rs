//! Unique department slug allocation.

use crate::repo::department_repo::DepartmentRepository;
use crate::repo::RepoResult;
use crate::text::normalize::slugify;

const FALLBACK_SLUG_BASE: &str = "department";

/// Returns `slugify(name)`, or the first free `base-N` (N >= 2) when taken.
///
/// Assumes a single writer; the `departments.slug` unique index catches races.
pub fn unique_department_slug<D: DepartmentRepository>(
    repo: &D,
    name: &str,
) -> RepoResult<String> {
    let mut base = slugify(name);
    if base.is_empty() {
        base = FALLBACK_SLUG_BASE.to_string();
    }

    if !repo.department_slug_exists(&base)? {
        return Ok(base);
    }

    let mut suffix: u32 = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !repo.department_slug_exists(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
