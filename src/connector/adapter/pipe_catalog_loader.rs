use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::domain::{DomainError, ProductRecord};

const DELIMITER: char = '|';
const QUOTE: char = '"';
const MIN_FIELDS: usize = 7;

/// Load a pipe-delimited catalog file.
///
/// Columns: id, name, description, price, currency, supply ability, minimum
/// order. The first non-blank record is a header. Short rows are skipped and
/// unparseable numbers fall back to zero.
pub fn load_products(path: impl AsRef<Path>) -> Result<Vec<ProductRecord>, DomainError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let products = parse_products(BufReader::new(file))?;
    info!("Loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

pub fn parse_products(mut reader: impl Read) -> Result<Vec<ProductRecord>, DomainError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    let mut products = Vec::new();
    for record in read_records(&input)?.into_iter().skip(1) {
        let line_no = record.line;
        let fields = record.fields;
        if fields.len() < MIN_FIELDS {
            warn!(
                "Skipping catalog line {}: expected {} fields, found {}",
                line_no,
                MIN_FIELDS,
                fields.len()
            );
            continue;
        }

        products.push(ProductRecord::new(
            fields[0].clone(),
            fields[1].clone(),
            fields[2].clone(),
            number_or_zero(&fields[3], "price", line_no),
            fields[4].clone(),
            number_or_zero(&fields[5], "supply ability", line_no),
            number_or_zero(&fields[6], "minimum order", line_no),
        ));
    }

    Ok(products)
}

/// One logical catalog row and the line it starts on.
#[derive(Debug)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Split input into records of `|`-separated fields.
///
/// A field that opens with `"` runs to the matching closing quote and may
/// contain the delimiter and line breaks; `""` inside it is a literal quote.
/// Blank lines are skipped and CRLF is treated as LF.
fn read_records(input: &str) -> Result<Vec<Record>, DomainError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    field.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            QUOTE if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            DELIMITER => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                finish_record(&mut records, &mut fields, &mut field, record_line);
                line += 1;
                record_line = line;
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    if in_quotes {
        return Err(DomainError::parse(format!(
            "catalog line {}: quoted field is never closed",
            record_line
        )));
    }
    finish_record(&mut records, &mut fields, &mut field, record_line);

    Ok(records)
}

fn finish_record(
    records: &mut Vec<Record>,
    fields: &mut Vec<String>,
    field: &mut String,
    line: usize,
) {
    if fields.is_empty() && field.trim().is_empty() {
        field.clear();
        return;
    }
    fields.push(std::mem::take(field));
    records.push(Record {
        line,
        fields: std::mem::take(fields),
    });
}

fn number_or_zero<T: FromStr + Default>(raw: &str, column: &str, line_no: usize) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "Catalog line {}: invalid {} '{}', using 0",
                line_no, column, raw
            );
            T::default()
        }
    }
}
