//! End-to-end reconciliation scenarios, with the live database simulated
//! by a parsed schema.

mod common;
use common::*;

use declaro_core::{plan, read_schemas, Schema};

const GREETING: &str = "CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(100));";

#[test]
fn create_against_an_empty_database() {
    let desired = parse(GREETING);
    let alteration = plan(&desired, &Schema::new());
    assert_eq!(
        alteration.statements(),
        [
            "CREATE TABLE `greeting` (\n  `id` int NOT NULL,\n  `body` varchar(100) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n)"
        ]
    );

    // After execution the live side renders as the normalized declaration.
    let live = replay(&Schema::new(), &alteration);
    assert_eq!(read_schemas(&script(&live)).unwrap(), read_schemas(GREETING).unwrap());
}

#[test]
fn externally_widened_column_is_narrowed_back() {
    let desired = parse(GREETING);
    let live = parse("CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(200))");
    let alteration = plan(&desired, &live);
    assert!(alteration.has_changes());
    assert_eq!(
        alteration.statements(),
        ["ALTER TABLE `greeting` MODIFY COLUMN `body` varchar(100) DEFAULT NULL"]
    );
}

#[test]
fn unchanged_declaration_is_a_no_op() {
    let desired = parse(GREETING);
    let live = replay(&Schema::new(), &plan(&desired, &Schema::new()));
    assert!(!plan(&parse(GREETING), &live).has_changes());
}

#[test]
fn display_artifacts_do_not_cause_changes() {
    let desired = parse(
        "CREATE TABLE t (
            a INTEGER(11) DEFAULT '5',
            b BOOL DEFAULT TRUE,
            c NUMERIC(8) DEFAULT 3,
            d FLOAT(30),
            e DATETIME(0) DEFAULT NOW(),
            f CHARACTER VARYING(10) DEFAULT NULL
        )",
    );
    let live = parse(
        "CREATE TABLE `t` (
            `a` int DEFAULT '5',
            `b` tinyint DEFAULT '1',
            `c` decimal(8,0) DEFAULT '3',
            `d` double DEFAULT NULL,
            `e` datetime DEFAULT CURRENT_TIMESTAMP,
            `f` varchar(10) DEFAULT NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_0900_ai_ci",
    );
    let alteration = plan(&desired, &live);
    assert!(!alteration.has_changes(), "{alteration}");
}

#[test]
fn parse_errors_name_the_statement() {
    let err = read_schemas("CREATE TABLE ok (a INT);\n\nCREATE TABLE bad (a INT,, b INT);").unwrap_err();
    assert_eq!(err.statement.as_deref(), Some("CREATE TABLE bad (a INT,, b INT)"));
    assert_eq!(err.location.map(|(line, _)| line), Some(3));
}

#[test]
fn decimal_defaults_are_exact() {
    let rendered = read_schemas(
        "CREATE TABLE t (
            d DECIMAL(20,2) DEFAULT 12345678901234567.89,
            e DECIMAL(10,2) DEFAULT 1.005,
            f DECIMAL(30,0) DEFAULT 123456789012345678901234567890
        )",
    )
    .unwrap();
    assert!(rendered[0].contains("`d` decimal(20,2) DEFAULT '12345678901234567.89'"));
    assert!(rendered[0].contains("`e` decimal(10,2) DEFAULT '1.01'"));
    assert!(rendered[0].contains("`f` decimal(30,0) DEFAULT '123456789012345678901234567890'"));

    // Values that differ only past float precision are still drift.
    let desired = parse("CREATE TABLE t (d DECIMAL(20,2) DEFAULT 12345678901234567.89)");
    let live = parse("CREATE TABLE t (d DECIMAL(20,2) DEFAULT 12345678901234567.88)");
    assert!(plan(&desired, &live).has_changes());
}
