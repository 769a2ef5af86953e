#![allow(dead_code)]

use declaro_core::{diff_schemas, parse_schema, plan, render_schema, Alteration, MySqlDialect, Schema};

pub fn parse(ddl: &str) -> Schema {
    parse_schema(ddl).unwrap_or_else(|e| panic!("Failed to parse: {ddl}\nError: {e}"))
}

/// Renders a schema back to one DDL script.
pub fn script(schema: &Schema) -> String {
    render_schema(schema, &MySqlDialect::new())
        .into_iter()
        .map(|statement| format!("{statement};\n"))
        .collect()
}

/// Applies an alteration to a schema by replaying it through the parser,
/// standing in for a live server.
pub fn replay(actual: &Schema, alteration: &Alteration) -> Schema {
    let ddl = format!("{}{alteration}", script(actual));
    parse_schema(&ddl).unwrap_or_else(|e| panic!("Replay failed: {e}\n{ddl}"))
}

/// Asserts that applying `plan(desired, actual)` to `actual` yields a
/// schema with nothing left to change.
pub fn assert_converges(desired: &str, actual: &str) {
    let desired = parse(desired);
    let actual = parse(actual);
    let alteration = plan(&desired, &actual);
    let after = replay(&actual, &alteration);
    let remaining = diff_schemas(&desired, &after);
    assert!(
        remaining.is_empty(),
        "Did not converge.\n  Applied:\n{alteration}\n  Remaining: {:#?}",
        remaining.to_sql(&MySqlDialect::new())
    );
}

pub fn position(statements: &[String], prefix: &str) -> usize {
    statements
        .iter()
        .position(|s| s.starts_with(prefix))
        .unwrap_or_else(|| panic!("No statement starting with {prefix:?} in {statements:#?}"))
}

pub const SHOP_V1: &str = "
    CREATE TABLE customers (
        id INT UNSIGNED NOT NULL AUTO_INCREMENT,
        email VARCHAR(255) NOT NULL,
        name VARCHAR(100),
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (id),
        UNIQUE KEY uq_customers_email (email)
    ) ENGINE=InnoDB;

    CREATE TABLE orders (
        id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        customer_id INT UNSIGNED NOT NULL,
        total DECIMAL(10,2) NOT NULL DEFAULT 0,
        note TEXT,
        CONSTRAINT fk_orders_customer FOREIGN KEY (customer_id) REFERENCES customers (id)
    );

    CREATE TABLE coupons (
        code CHAR(8) NOT NULL PRIMARY KEY,
        order_id INT UNSIGNED,
        FOREIGN KEY (order_id) REFERENCES orders (id) ON DELETE SET NULL
    );
";

pub const SHOP_V2: &str = "
    CREATE TABLE customers (
        id INT UNSIGNED NOT NULL AUTO_INCREMENT,
        name VARCHAR(150) NOT NULL DEFAULT '',
        email VARCHAR(255) NOT NULL,
        phone VARCHAR(20) COMMENT 'E.164',
        PRIMARY KEY (id),
        UNIQUE KEY uq_customers_email (email),
        KEY idx_customers_name (name(20))
    ) ENGINE=InnoDB COMMENT='registered buyers';

    CREATE TABLE orders (
        id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        customer_id INT UNSIGNED NOT NULL,
        status ENUM('new', 'paid', 'shipped') NOT NULL DEFAULT 'new',
        total DECIMAL(12,2) NOT NULL DEFAULT 0,
        CONSTRAINT fk_orders_customer FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE CASCADE
    );

    CREATE TABLE order_lines (
        order_id INT UNSIGNED NOT NULL,
        line SMALLINT NOT NULL,
        sku VARCHAR(32) NOT NULL,
        PRIMARY KEY (order_id, line),
        CONSTRAINT fk_lines_order FOREIGN KEY (order_id) REFERENCES orders (id)
    );
";
