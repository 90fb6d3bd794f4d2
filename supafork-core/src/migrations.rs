//! Supabase migration naming conventions and selection handling
//!
//! Migration files live under `supabase/migrations` and follow the
//! `<YYYYMMDDHHMMSS>_<label>.sql` convention produced by the Supabase CLI.
//! The timestamp prefix is zero-padded, so lexicographic order of file names
//! is chronological order.

use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::{Error, Result};

/// Well-known directory that holds a project's migration history
pub const MIGRATIONS_DIR: &str = "supabase/migrations";

/// File name component of a migration path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Timestamp parsed from the file name prefix, if the name follows the
/// Supabase convention
pub fn timestamp(path: &str) -> Option<NaiveDateTime> {
    let prefix = file_name(path).split('_').next()?;
    if prefix.len() != 14 || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(prefix, "%Y%m%d%H%M%S").ok()
}

/// Human-readable label of a migration, with the timestamp prefix and the
/// `.sql` suffix stripped
pub fn label(path: &str) -> &str {
    let name = file_name(path);
    let name = name.strip_suffix(".sql").unwrap_or(name);
    match name.split_once('_') {
        Some((prefix, rest))
            if !rest.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => name,
    }
}

/// Default execution order for a set of migration paths
///
/// Sorts by path, which for timestamp-prefixed names in a single directory
/// is chronological order.
pub fn default_order(paths: &[String]) -> Vec<String> {
    let mut ordered = paths.to_vec();
    ordered.sort();
    ordered
}

/// Resolve the set of migrations to apply
///
/// With no explicit selection, every available migration is applied in
/// default order. An explicit selection is validated against the available
/// paths and kept in the caller's order, which becomes the execution order.
pub fn resolve_selection(
    available: &[String],
    requested: Option<&[String]>,
) -> Result<Vec<String>> {
    let Some(requested) = requested else {
        return Ok(default_order(available));
    };

    let known: HashSet<&str> = available.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    for path in requested {
        if !known.contains(path.as_str()) {
            return Err(Error::UnknownMigration(path.clone()));
        }
        if !seen.insert(path.as_str()) {
            return Err(Error::DuplicateSelection(path.clone()));
        }
    }

    Ok(requested.to_vec())
}
