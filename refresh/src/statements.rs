//! SQL statement text used by the refresh engine.
//!
//! Statements are assembled as plain strings because every identifier and the
//! optional filter come from operator-supplied configuration. Keeping the
//! builders pure makes the exact statement shapes unit-testable without a
//! database.

/// Returns the statement capturing a table's definition.
pub fn show_create_table(table: &str) -> String {
    format!("SHOW CREATE TABLE {table}")
}

/// Returns the statement counting the rows of `table`.
///
/// The count is deliberately not subject to the optional filter even though
/// the page queries are; loop termination must therefore never rely on the
/// count alone (see the zero-row page guard in the copy engine).
pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// Returns the deterministic page query for one offset/limit window.
///
/// With a filter set, the `WHERE` clause sits immediately before
/// `ORDER BY`; with no filter the clause is omitted entirely. Ordering by
/// the primary key gives each page a stable, non-overlapping window even
/// under concurrent deletes on the source.
pub fn page_select(
    table: &str,
    where_clause: Option<&str>,
    primary_key: &str,
    offset: u64,
    batch_size: u64,
) -> String {
    match where_clause {
        Some(clause) => format!(
            "SELECT * FROM {table} WHERE {clause} ORDER BY {primary_key} LIMIT {offset}, {batch_size}"
        ),
        None => {
            format!("SELECT * FROM {table} ORDER BY {primary_key} LIMIT {offset}, {batch_size}")
        }
    }
}

/// Returns the INSERT-from-SELECT statement copying one page into the shadow
/// table.
pub fn insert_page(shadow_table: &str, page_select: &str) -> String {
    format!("INSERT INTO {shadow_table} {page_select}")
}

/// Returns the idempotent statement dropping the shadow table.
pub fn drop_shadow_table(shadow_table: &str) -> String {
    format!("DROP TABLE IF EXISTS {shadow_table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_select_with_filter_places_where_before_order_by() {
        let query = page_select("test_db", Some("country='CA'"), "id", 0, 200);

        assert_eq!(
            query,
            "SELECT * FROM test_db WHERE country='CA' ORDER BY id LIMIT 0, 200"
        );
    }

    #[test]
    fn test_page_select_without_filter_omits_where_clause() {
        let query = page_select("test_db", None, "id", 40, 20);

        assert_eq!(query, "SELECT * FROM test_db ORDER BY id LIMIT 40, 20");
        assert!(!query.contains("WHERE"));
    }

    #[test]
    fn test_count_is_never_filtered() {
        assert_eq!(count_rows("test_db"), "SELECT COUNT(*) FROM test_db");
    }

    #[test]
    fn test_insert_page_embeds_the_page_select() {
        let select = page_select("orders", Some("status='open'"), "id", 10, 10);
        let insert = insert_page("orders_data_pipeline_refresh", &select);

        assert_eq!(
            insert,
            "INSERT INTO orders_data_pipeline_refresh SELECT * FROM orders \
             WHERE status='open' ORDER BY id LIMIT 10, 10"
        );
    }

    #[test]
    fn test_drop_shadow_table_is_guarded_with_if_exists() {
        assert_eq!(
            drop_shadow_table("orders_data_pipeline_refresh"),
            "DROP TABLE IF EXISTS orders_data_pipeline_refresh"
        );
    }

    #[test]
    fn test_show_create_table() {
        assert_eq!(show_create_table("customers"), "SHOW CREATE TABLE customers");
    }
}
