//! The result of a reconciliation.

use std::fmt;

use crate::dialect::{DdlDialect, MySqlDialect};
use crate::diff::{diff_schemas, SchemaDiff};
use crate::schema::Schema;

/// An ordered sequence of DDL statements which, applied in order, turn
/// the actual database into the desired one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alteration {
    statements: Vec<String>,
}

impl Alteration {
    /// Creates an alteration from statements already in execution order.
    #[must_use]
    pub const fn new(statements: Vec<String>) -> Self {
        Self { statements }
    }

    /// Renders a diff with the given dialect.
    #[must_use]
    pub fn from_diff(diff: &SchemaDiff, dialect: &impl DdlDialect) -> Self {
        Self::new(diff.to_sql(dialect))
    }

    /// Returns true if there is at least one statement to run.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.statements.is_empty()
    }

    /// The statements in execution order.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if there is nothing to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Consumes the alteration, returning its statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

impl fmt::Display for Alteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement};")?;
        }
        Ok(())
    }
}

impl IntoIterator for Alteration {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Alteration {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// Diffs `desired` against `actual` and renders MySQL statements.
#[must_use]
pub fn plan(desired: &Schema, actual: &Schema) -> Alteration {
    Alteration::from_diff(&diff_schemas(desired, actual), &MySqlDialect::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;

    #[test]
    fn empty_alteration_has_no_changes() {
        let alteration = Alteration::default();
        assert!(!alteration.has_changes());
        assert_eq!(alteration.to_string(), "");
    }

    #[test]
    fn display_terminates_statements() {
        let alteration = Alteration::new(vec![
            String::from("DROP TABLE `a`"),
            String::from("DROP TABLE `b`"),
        ]);
        assert!(alteration.has_changes());
        assert_eq!(alteration.to_string(), "DROP TABLE `a`;\nDROP TABLE `b`;\n");
        let collected: Vec<&String> = (&alteration).into_iter().collect();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn plan_renders_mysql() {
        let desired = parse_schema("CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(100))").unwrap();
        let alteration = plan(&desired, &Schema::new());
        assert_eq!(alteration.len(), 1);
        assert!(alteration.statements()[0].starts_with("CREATE TABLE `greeting` ("));
        assert!(plan(&desired, &desired).is_empty());
    }
}
