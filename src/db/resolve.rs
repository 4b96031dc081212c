use rusqlite::{params, Connection};

use crate::error::SprintdeskError;

/// Resolve a ULID or ULID prefix to a full id: exact match first, then a
/// unique prefix. `table` is always one of our own table names.
pub fn resolve_id(
    conn: &Connection,
    table: &str,
    kind: &str,
    reference: &str,
) -> Result<String, SprintdeskError> {
    let reference = reference.trim().to_ascii_uppercase();
    if reference.is_empty() {
        return Err(SprintdeskError::validation(format!("{kind} reference is empty")));
    }

    let exact: Option<String> = {
        let mut stmt = conn.prepare(&format!("SELECT id FROM {table} WHERE id = ?1"))?;
        let mut rows = stmt.query(params![reference])?;
        match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        }
    };
    if let Some(id) = exact {
        return Ok(id);
    }

    let mut stmt = conn.prepare(&format!("SELECT id FROM {table} WHERE id LIKE ?1 LIMIT 6"))?;
    let ids = stmt
        .query_map(params![format!("{reference}%")], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match ids.as_slice() {
        [] => Err(SprintdeskError::not_found(kind, &reference)),
        [only] => Ok(only.clone()),
        _ => Err(SprintdeskError::ambiguous_ref(&reference, &ids)),
    }
}
