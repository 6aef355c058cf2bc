//! Closed code-to-label tables used when building pricing filters.
//!
//! The pricing catalog names engines, editions and license models differently
//! from the listing API. Every table is a process-wide constant; a code that is
//! not in a table maps to an empty label, which simply yields no pricing match.

/// Immutable mapping from a vendor code to a human-readable label
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    entries: &'static [(&'static str, &'static str)],
}

impl LookupTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Label for `code`, or `None` when the code is unknown
    pub fn get(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, label)| *label)
    }

    /// Label for `code`, or an empty string when the code is unknown
    pub fn label(&self, code: &str) -> &'static str {
        self.get(code).unwrap_or("")
    }

}

/// Database engine codes to the catalog's `databaseEngine` values
pub static DB_ENGINES: LookupTable = LookupTable::new(&[
    ("aurora-mysql", "Aurora MySQL"),
    ("aurora-postgresql", "Aurora PostgreSQL"),
    ("mariadb", "MariaDB"),
    ("mysql", "MySQL"),
    ("postgres", "PostgreSQL"),
    ("sqlserver", "SQL Server"),
    ("oracle", "Oracle"),
]);

/// Edition suffixes (Oracle, SQL Server) to the catalog's `databaseEdition` values
pub static DB_EDITIONS: LookupTable = LookupTable::new(&[
    ("ee", "Enterprise"),
    ("se2", "Standard Two"),
    ("se", "Standard"),
    ("web", "Web"),
    ("ex", "Express"),
]);

/// License model codes to the catalog's `licenseModel` values
pub static DB_LICENSES: LookupTable = LookupTable::new(&[
    ("license-included", "License included"),
    ("bring-your-own-license", "Bring your own license"),
    ("general-public-license", "General public license"),
]);

/// Engine families priced per license model and edition
pub const DEFAULT_LICENSE_SENSITIVE_ENGINES: &[&str] = &["oracle", "sqlserver"];

/// Catalog engine name for a raw engine code.
///
/// The full code is tried first so that compound codes like `aurora-postgresql`
/// resolve; otherwise the family segment is used.
pub fn engine_label(engine: &str, family: &str) -> &'static str {
    DB_ENGINES
        .get(engine)
        .unwrap_or_else(|| DB_ENGINES.label(family))
}

/// Catalog edition name for the part of an engine code after the family.
///
/// Suffixes such as `ee-cdb` carry a qualifier after the edition; the full
/// suffix is tried first, then its leading segment.
pub fn edition_label(edition: &str) -> &'static str {
    DB_EDITIONS.get(edition).unwrap_or_else(|| {
        edition
            .split('-')
            .next()
            .map(|segment| DB_EDITIONS.label(segment))
            .unwrap_or("")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_resolve() {
        assert_eq!(DB_ENGINES.label("postgres"), "PostgreSQL");
        assert_eq!(DB_EDITIONS.label("se2"), "Standard Two");
        assert_eq!(DB_LICENSES.label("license-included"), "License included");
    }

    #[test]
    fn test_unknown_codes_yield_empty_label() {
        assert_eq!(DB_ENGINES.label("db2"), "");
        assert_eq!(DB_EDITIONS.label("dev"), "");
        assert!(DB_LICENSES.get("postgresql-license").is_none());
    }

    #[test]
    fn test_engine_label_prefers_full_code() {
        assert_eq!(engine_label("aurora-postgresql", "aurora"), "Aurora PostgreSQL");
        assert_eq!(engine_label("oracle-ee", "oracle"), "Oracle");
        assert_eq!(engine_label("custom-oracle-ee", "custom"), "");
    }

    #[test]
    fn test_edition_label_drops_qualifier() {
        assert_eq!(edition_label("se2"), "Standard Two");
        assert_eq!(edition_label("ee-cdb"), "Enterprise");
        assert_eq!(edition_label("se2-cdb"), "Standard Two");
        assert_eq!(edition_label(""), "");
        assert_eq!(edition_label("dev-cdb"), "");
    }
}
