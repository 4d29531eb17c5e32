//! Shadow table naming and DDL transformation.
//!
//! The shadow table is schema-identical to the source table but declares the
//! BLACKHOLE engine, which accepts and replication-logs writes while
//! persisting zero rows. The transformation is pure string rewriting over the
//! captured `SHOW CREATE TABLE` output.

use crate::error::{RefreshError, RefreshResult};

/// Suffix appended to the source table name to derive the shadow table name.
pub const SHADOW_TABLE_SUFFIX: &str = "_data_pipeline_refresh";

/// The storage engine declared on every shadow table.
pub const DISCARD_ENGINE: &str = "BLACKHOLE";

/// A table definition captured from the source database.
///
/// Fetched once per run and used only to derive the shadow definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// Name of the table as reported by the database.
    pub name: String,
    /// The full `CREATE TABLE` DDL text.
    pub ddl: String,
}

/// Returns the shadow table name for `table`.
///
/// The name is deterministic and always recomputable; it is never stored.
pub fn shadow_table_name(table: &str) -> String {
    format!("{table}{SHADOW_TABLE_SUFFIX}")
}

/// Rewrites a captured table definition into the shadow table definition.
///
/// The first occurrence of the source table name is replaced with the shadow
/// name and the declared engine is replaced with [`DISCARD_ENGINE`],
/// regardless of which engine was originally declared. Every other clause
/// (columns, indexes, character set, keys) passes through verbatim.
///
/// Fails with [`RefreshError::SchemaParse`] when the table name or an engine
/// clause cannot be located: producing subtly invalid DDL is worse than
/// failing loudly, so the raw text is surfaced instead of guessing.
pub fn transform_to_shadow(definition: &TableDefinition) -> RefreshResult<String> {
    if definition.name.is_empty() || !definition.ddl.contains(&definition.name) {
        return Err(RefreshError::SchemaParse {
            reason: "table name not found in DDL",
            ddl: definition.ddl.clone(),
        });
    }

    let shadow = shadow_table_name(&definition.name);
    let renamed = definition.ddl.replacen(&definition.name, &shadow, 1);

    replace_engine(&renamed).ok_or_else(|| RefreshError::SchemaParse {
        reason: "no engine clause found in DDL",
        ddl: definition.ddl.clone(),
    })
}

/// Replaces the `ENGINE=<token>` clause with the discard engine, or returns
/// [`None`] when no engine clause is present. The token ends at the first
/// whitespace character, so trailing clauses survive untouched.
fn replace_engine(ddl: &str) -> Option<String> {
    let clause_start = ddl.find("ENGINE=")?;
    let value_start = clause_start + "ENGINE=".len();
    let value_len = ddl[value_start..]
        .find(|c: char| c.is_whitespace())
        .unwrap_or(ddl.len() - value_start);

    let mut rewritten = String::with_capacity(ddl.len());
    rewritten.push_str(&ddl[..value_start]);
    rewritten.push_str(DISCARD_ENGINE);
    rewritten.push_str(&ddl[value_start + value_len..]);

    Some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str, ddl: &str) -> TableDefinition {
        TableDefinition {
            name: name.to_string(),
            ddl: ddl.to_string(),
        }
    }

    #[test]
    fn test_shadow_table_name_uses_fixed_suffix() {
        assert_eq!(shadow_table_name("orders"), "orders_data_pipeline_refresh");
    }

    #[test]
    fn test_transform_renames_table_and_swaps_engine() {
        let definition = definition(
            "test_db",
            "CREATE TABLE test_db(\
             PersonID int,\
             LastName varchar(255),\
             FirstName varchar(255),\
             Address varchar(255),\
             City varchar(255))\
             ENGINE=InnoDB",
        );

        let shadow_ddl = transform_to_shadow(&definition).unwrap();

        assert_eq!(
            shadow_ddl,
            "CREATE TABLE test_db_data_pipeline_refresh(\
             PersonID int,\
             LastName varchar(255),\
             FirstName varchar(255),\
             Address varchar(255),\
             City varchar(255))\
             ENGINE=BLACKHOLE"
        );
    }

    #[test]
    fn test_transform_preserves_clauses_after_the_engine() {
        let definition = definition(
            "orders",
            "CREATE TABLE orders (id int NOT NULL, PRIMARY KEY (id)) \
             ENGINE=MyISAM AUTO_INCREMENT=42 DEFAULT CHARSET=utf8mb4",
        );

        let shadow_ddl = transform_to_shadow(&definition).unwrap();

        assert_eq!(
            shadow_ddl,
            "CREATE TABLE orders_data_pipeline_refresh (id int NOT NULL, PRIMARY KEY (id)) \
             ENGINE=BLACKHOLE AUTO_INCREMENT=42 DEFAULT CHARSET=utf8mb4"
        );
    }

    #[test]
    fn test_transform_only_renames_the_first_name_occurrence() {
        let definition = definition(
            "user",
            "CREATE TABLE user (user_id int, name varchar(32)) ENGINE=InnoDB",
        );

        let shadow_ddl = transform_to_shadow(&definition).unwrap();

        assert_eq!(
            shadow_ddl,
            "CREATE TABLE user_data_pipeline_refresh (user_id int, name varchar(32)) \
             ENGINE=BLACKHOLE"
        );
    }

    #[test]
    fn test_transform_fails_when_no_engine_clause_is_present() {
        let definition = definition("orders", "CREATE TABLE orders (id int)");

        let err = transform_to_shadow(&definition).unwrap_err();

        assert!(matches!(
            err,
            RefreshError::SchemaParse { ddl, .. } if ddl == "CREATE TABLE orders (id int)"
        ));
    }

    #[test]
    fn test_transform_fails_when_the_table_name_is_missing_from_the_ddl() {
        let definition = definition("orders", "CREATE TABLE customers (id int) ENGINE=InnoDB");

        assert!(matches!(
            transform_to_shadow(&definition),
            Err(RefreshError::SchemaParse { .. })
        ));
    }
}
