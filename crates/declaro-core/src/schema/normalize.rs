//! MySQL type and default normalization.
//!
//! Both the DDL parser and the catalog introspector funnel raw type
//! names, type arguments and default values through this module, so the
//! two sides of a diff never disagree over spelling: `INTEGER` and
//! `int(11)` are both `int`, `DEFAULT 1` on a `decimal(10,2)` is `1.00`,
//! `NOW()` is `CURRENT_TIMESTAMP`.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{DataType, DefaultValue};

static CURRENT_TIMESTAMP: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:current_timestamp|now|localtime|localtimestamp)\s*(?:\(\s*(\d*)\s*\))?$",
    )
});

static CHARSET_INTRODUCER: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b_(?:utf8mb4|utf8mb3|utf8|latin1|latin2|ascii|binary|ucs2|utf16|utf16le|utf32|cp1250|cp1251|cp1252|gbk|big5|sjis|euckr)\s*'",
    )
});

const TINY_LIMIT: u64 = 255;
const TEXT_LIMIT: u64 = 65_535;
const MEDIUM_LIMIT: u64 = 16_777_215;

/// Resolves a raw type name and its arguments to the canonical type.
///
/// `name` may be any synonym MySQL accepts (`INTEGER`, `DEC`,
/// `CHARACTER VARYING`, `DOUBLE PRECISION`, ...). `args` are the raw
/// arguments between the parentheses; enum and set members must already
/// be quoted.
///
/// # Errors
///
/// Returns a message when the type is unknown or its arguments are invalid.
pub fn data_type(
    name: &str,
    args: &[String],
    unsigned: bool,
    zerofill: bool,
) -> Result<DataType, String> {
    let lowered = name.to_ascii_lowercase();
    let base = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let args: Vec<&str> = args.iter().map(|a| a.trim()).collect();

    let mut ty = match base.as_str() {
        "bool" | "boolean" => DataType::simple("tinyint"),
        "tinyint" | "int1" => DataType::simple("tinyint"),
        "smallint" | "int2" => DataType::simple("smallint"),
        "mediumint" | "int3" | "middleint" => DataType::simple("mediumint"),
        "int" | "integer" | "int4" => DataType::simple("int"),
        "bigint" | "int8" => DataType::simple("bigint"),
        "decimal" | "dec" | "numeric" | "fixed" => match args.as_slice() {
            [] => DataType::with_args("decimal", "10,0"),
            [p] => DataType::with_args("decimal", format!("{},0", number(p)?)),
            [p, s] => DataType::with_args("decimal", format!("{},{}", number(p)?, number(s)?)),
            _ => return Err(format!("too many arguments for {base}")),
        },
        "float" | "float4" => match args.as_slice() {
            [] => DataType::simple("float"),
            [p] if number(p)? <= 24 => DataType::simple("float"),
            [p] if number(p)? <= 53 => DataType::simple("double"),
            [_] => return Err(String::from("float precision out of range")),
            [m, d] => DataType::with_args("float", format!("{},{}", number(m)?, number(d)?)),
            _ => return Err(format!("too many arguments for {base}")),
        },
        "double" | "double precision" | "real" | "float8" => match args.as_slice() {
            [] => DataType::simple("double"),
            [m, d] => DataType::with_args("double", format!("{},{}", number(m)?, number(d)?)),
            _ => return Err(format!("invalid arguments for {base}")),
        },
        "bit" => sized("bit", &args, 1)?,
        "char" | "character" | "nchar" | "national char" | "national character" => {
            sized("char", &args, 1)?
        }
        "binary" => sized("binary", &args, 1)?,
        "varchar"
        | "nvarchar"
        | "character varying"
        | "char varying"
        | "national varchar"
        | "national char varying"
        | "national character varying"
        | "nchar varchar"
        | "nchar varying" => required_length("varchar", &args)?,
        "varbinary" => required_length("varbinary", &args)?,
        "tinytext" | "mediumtext" | "longtext" | "tinyblob" | "mediumblob" | "longblob" => {
            DataType::simple(base.clone())
        }
        "long" | "long varchar" => DataType::simple("mediumtext"),
        "long varbinary" => DataType::simple("mediumblob"),
        "text" => lob("text", &args)?,
        "blob" => lob("blob", &args)?,
        "date" => DataType::simple("date"),
        "year" => DataType::simple("year"),
        "datetime" | "timestamp" | "time" => match args.as_slice() {
            [] => DataType::simple(base.clone()),
            [fsp] if number(fsp)? == 0 => DataType::simple(base.clone()),
            [fsp] if number(fsp)? <= 6 => DataType::with_args(base.clone(), number(fsp)?.to_string()),
            _ => return Err(format!("invalid fractional seconds precision for {base}")),
        },
        "enum" | "set" => {
            if args.is_empty() {
                return Err(format!("{base} requires at least one value"));
            }
            DataType::with_args(base.clone(), args.join(","))
        }
        "json" => DataType::simple("json"),
        "geometry" | "point" | "linestring" | "polygon" | "multipoint" | "multilinestring"
        | "multipolygon" => DataType::simple(base.clone()),
        "geometrycollection" | "geomcollection" => DataType::simple("geomcollection"),
        _ => return Err(format!("unknown data type '{name}'")),
    };

    if ty.is_numeric() {
        ty.zerofill = zerofill;
        ty.unsigned = unsigned || zerofill;
    }
    Ok(ty)
}

fn number(arg: &str) -> Result<u64, String> {
    arg.parse::<u64>()
        .map_err(|_| format!("expected a number, found '{arg}'"))
}

fn sized(name: &str, args: &[&str], default: u64) -> Result<DataType, String> {
    match args {
        [] => Ok(DataType::with_args(name, default.to_string())),
        [n] => Ok(DataType::with_args(name, number(n)?.to_string())),
        _ => Err(format!("too many arguments for {name}")),
    }
}

fn required_length(name: &str, args: &[&str]) -> Result<DataType, String> {
    match args {
        [n] => Ok(DataType::with_args(name, number(n)?.to_string())),
        _ => Err(format!("{name} requires a length")),
    }
}

/// `TEXT(n)` and `BLOB(n)` pick the smallest type that can hold `n` bytes.
fn lob(family: &str, args: &[&str]) -> Result<DataType, String> {
    let size = match args {
        [] => return Ok(DataType::simple(family)),
        [n] => number(n)?,
        _ => return Err(format!("too many arguments for {family}")),
    };
    let prefix = match size {
        0 => "",
        s if s <= TINY_LIMIT => "tiny",
        s if s <= TEXT_LIMIT => "",
        s if s <= MEDIUM_LIMIT => "medium",
        _ => "long",
    };
    Ok(DataType::simple(format!("{prefix}{family}")))
}

/// Quotes an enum or set member the way the catalog renders it.
#[must_use]
pub fn quote_member(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Splits a catalog `COLUMN_TYPE` such as `int(10) unsigned zerofill`
/// or `enum('a','b')` and resolves it to the canonical type.
///
/// # Errors
///
/// Returns a message when the type cannot be resolved.
pub fn column_type(raw: &str) -> Result<DataType, String> {
    let raw = raw.trim();
    let (head, args, tail) = match raw.find('(') {
        Some(open) => {
            let close = matching_paren(raw, open)
                .ok_or_else(|| format!("unbalanced parentheses in '{raw}'"))?;
            (
                &raw[..open],
                split_args(&raw[open + 1..close]),
                &raw[close + 1..],
            )
        }
        None => {
            let split = raw
                .find(|c: char| c.is_whitespace())
                .unwrap_or(raw.len());
            (&raw[..split], Vec::new(), &raw[split..])
        }
    };
    let tail = tail.to_ascii_lowercase();
    let words: Vec<&str> = tail.split_whitespace().collect();
    data_type(
        head.trim(),
        &args,
        words.contains(&"unsigned"),
        words.contains(&"zerofill"),
    )
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = text.char_indices().skip_while(|(i, _)| *i < open).peekable();
    while let Some((i, c)) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                if chars.peek().map(|(_, n)| *n) == Some(q) {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            (None, _) => {}
        }
    }
    None
}

/// Splits on top-level commas, leaving quoted members intact.
fn split_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                } else if c == q {
                    if chars.peek() == Some(&q) {
                        current.push(q);
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => args.push(std::mem::take(&mut current).trim().to_string()),
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() || !args.is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

/// Normalizes a literal default for a column of type `ty`.
///
/// Numeric columns get their value reformatted the way the catalog
/// stores it: integers without leading zeros, decimals padded to their
/// scale, floats in shortest form.
/// BIT columns keep their default as a `b'...'` literal without leading
/// zeros.
#[must_use]
pub fn literal(value: &str, ty: &DataType) -> DefaultValue {
    if ty.name == "bit" {
        if let Some(bits) = bit_literal(value.trim()) {
            return DefaultValue::Literal(bits);
        }
    }
    DefaultValue::Literal(format_number(value.trim(), ty).unwrap_or_else(|| value.to_string()))
}

fn bit_literal(value: &str) -> Option<String> {
    let number = match value
        .strip_prefix("b'")
        .or_else(|| value.strip_prefix("B'"))
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(digits) if digits.is_empty() => 0,
        Some(digits) => u128::from_str_radix(digits, 2).ok()?,
        None => value.parse::<u128>().ok()?,
    };
    Some(format!("b'{number:b}'"))
}

/// Normalizes an `X'..'` / `0x..` default.
///
/// BIT columns get the bit literal; other columns get the decoded text.
///
/// # Errors
///
/// Returns an error when the digits do not decode to UTF-8 text.
pub fn hex_literal(digits: &str, ty: &DataType) -> Result<DefaultValue, String> {
    if ty.name == "bit" || ty.is_numeric() {
        let number = u128::from_str_radix(digits, 16)
            .map_err(|_| format!("hex default 0x{digits} is out of range"))?;
        return Ok(literal(&number.to_string(), ty));
    }
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        })
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| format!("malformed hex default 0x{digits}"))?;
    String::from_utf8(bytes)
        .map(DefaultValue::Literal)
        .map_err(|_| format!("hex default 0x{digits} is not valid text"))
}

fn format_number(value: &str, ty: &DataType) -> Option<String> {
    if !ty.is_numeric() || value.is_empty() {
        return None;
    }
    let value = value.strip_prefix('+').unwrap_or(value);
    if ty.is_integer() {
        return round_decimal(value, 0);
    }
    match ty.decimal_scale() {
        Some(scale) => round_decimal(value, scale),
        None if ty.name == "decimal" => round_decimal(value, 0),
        None => value.parse::<f64>().ok().map(|f| format!("{f}")),
    }
}

/// Rounds a decimal literal to `scale` fractional digits, half away from
/// zero, without leaving base ten. Exponents are folded into the digits.
fn round_decimal(value: &str, scale: usize) -> Option<String> {
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
            (mantissa, exponent.parse::<i64>().ok()?)
        }
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }
    // DECIMAL holds at most 65 digits; anything further out is not a default.
    if exponent.unsigned_abs() > 128 {
        return None;
    }

    let digits = format!("{whole}{fraction}");
    let point = i64::try_from(whole.len()).ok()? + exponent;
    let (mut integer, mut fractional) = if point <= 0 {
        let zeros = usize::try_from(-point).ok()?;
        (String::new(), format!("{}{digits}", "0".repeat(zeros)))
    } else {
        let point = usize::try_from(point).ok()?;
        if point >= digits.len() {
            (format!("{digits}{}", "0".repeat(point - digits.len())), String::new())
        } else {
            (digits[..point].to_string(), digits[point..].to_string())
        }
    };

    if fractional.len() > scale {
        let round_up = fractional.as_bytes()[scale] >= b'5';
        fractional.truncate(scale);
        if round_up {
            let mut carried = increment(&format!("{integer}{fractional}"));
            let split = carried.len() - scale;
            fractional = carried.split_off(split);
            integer = carried;
        }
    } else {
        fractional.push_str(&"0".repeat(scale - fractional.len()));
    }

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    let is_zero = integer == "0" && fractional.bytes().all(|b| b == b'0');
    let sign = if negative && !is_zero { "-" } else { "" };
    if scale == 0 {
        Some(format!("{sign}{integer}"))
    } else {
        Some(format!("{sign}{integer}.{fractional}"))
    }
}

/// Adds one to a string of decimal digits.
fn increment(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }
    bytes.insert(0, b'1');
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Recognises the `CURRENT_TIMESTAMP` family (`NOW()`, `LOCALTIME`, ...)
/// and returns its canonical spelling.
#[must_use]
pub fn current_timestamp(text: &str) -> Option<String> {
    let re = CURRENT_TIMESTAMP.as_ref().ok()?;
    let caps = re.captures(text.trim())?;
    match caps.get(1).map(|m| m.as_str()) {
        Some(fsp) if !fsp.is_empty() && fsp != "0" => Some(format!("CURRENT_TIMESTAMP({fsp})")),
        _ => Some(String::from("CURRENT_TIMESTAMP")),
    }
}

/// Normalizes an expression default such as `(UUID())`.
#[must_use]
pub fn expression(text: &str) -> DefaultValue {
    let stripped = strip_outer_parens(text.trim());
    current_timestamp(stripped).map_or_else(
        || DefaultValue::Expression(normalize_expression(text)),
        DefaultValue::Expression,
    )
}

/// Canonical text of a SQL expression: charset introducers and
/// backticks removed, keywords and names lowercased, whitespace
/// collapsed, and redundant outer parentheses dropped. Quoted text is
/// preserved, with double-quoted strings rewritten in single quotes.
#[must_use]
pub fn normalize_expression(text: &str) -> String {
    let without_introducers = match CHARSET_INTRODUCER.as_ref() {
        Ok(re) => re.replace_all(text, "'").into_owned(),
        Err(_) => text.to_string(),
    };

    let mut out = String::with_capacity(without_introducers.len());
    let mut chars = without_introducers.chars().peekable();
    let mut pending_space = false;
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                flush_space(&mut out, pending_space, '\'');
                pending_space = false;
                out.push('\'');
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        out.push(inner);
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if inner == c {
                        if chars.peek() == Some(&c) {
                            chars.next();
                            out.push_str(if c == '\'' { "''" } else { "\"" });
                        } else {
                            break;
                        }
                    } else if inner == '\'' {
                        out.push_str("''");
                    } else {
                        out.push(inner);
                    }
                }
                out.push('\'');
            }
            '`' => {}
            c if c.is_whitespace() => pending_space = true,
            c => {
                flush_space(&mut out, pending_space, c);
                pending_space = false;
                out.extend(c.to_lowercase());
            }
        }
    }

    strip_outer_parens(&out).to_string()
}

fn is_tight(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | ',' | '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '|' | '&'
    )
}

fn flush_space(out: &mut String, pending: bool, next: char) {
    if pending && !out.is_empty() && !is_tight(next) && !out.ends_with(is_tight) {
        out.push(' ');
    }
}

/// Removes parentheses that wrap the whole expression.
#[must_use]
pub fn strip_outer_parens(text: &str) -> &str {
    let mut current = text.trim();
    while current.starts_with('(') && matching_paren(current, 0) == Some(current.len() - 1) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

/// Normalizes a default value reported by the catalog.
///
/// `extra` is the catalog `EXTRA` column: `DEFAULT_GENERATED` marks
/// expression defaults on servers that report it; older servers only
/// report `CURRENT_TIMESTAMP` bare, which is recognised by shape.
#[must_use]
pub fn catalog_default(raw: Option<&str>, extra: &str, ty: &DataType) -> Option<DefaultValue> {
    let raw = raw?;
    let generated = extra.to_ascii_uppercase().contains("DEFAULT_GENERATED");
    if generated {
        return Some(expression(&raw.replace("\\'", "'")));
    }
    if ty.is_temporal() || ty.name == "time" || ty.name == "date" {
        if let Some(ts) = current_timestamp(raw) {
            return Some(DefaultValue::Expression(ts));
        }
    }
    Some(literal(raw, ty))
}

/// Extracts the `on update CURRENT_TIMESTAMP[(n)]` clause of a catalog
/// `EXTRA` column.
#[must_use]
pub fn catalog_on_update(extra: &str) -> Option<String> {
    let lowered = extra.to_ascii_lowercase();
    let at = lowered.find("on update ")?;
    let rest = &extra[at + "on update ".len()..];
    let token = rest.split_whitespace().next()?;
    current_timestamp(token)
}

/// Canonical engine spelling (`innodb` becomes `InnoDB`).
#[must_use]
pub fn engine(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "innodb" => String::from("InnoDB"),
        "myisam" => String::from("MyISAM"),
        "memory" | "heap" => String::from("MEMORY"),
        "csv" => String::from("CSV"),
        "archive" => String::from("ARCHIVE"),
        "blackhole" => String::from("BLACKHOLE"),
        "merge" | "mrg_myisam" => String::from("MRG_MYISAM"),
        "federated" => String::from("FEDERATED"),
        "ndb" | "ndbcluster" => String::from("ndbcluster"),
        _ => name.to_string(),
    }
}
