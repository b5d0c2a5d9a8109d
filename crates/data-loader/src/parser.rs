//! Parser for the product catalog CSV file.
//!
//! The catalog is exported from a dataframe, so it follows the usual CSV
//! conventions: comma separated, double-quoted fields with `""` escapes,
//! quoted fields that may span several lines, and an optional UTF-8 BOM.
//!
//! Parsing happens in two steps:
//! 1. `split_records` turns the raw text into records of string fields
//! 2. `parse_product` turns one record into a typed `ProductRecord`

use crate::error::{DataLoadError, Result};
use crate::types::*;
use tracing::warn;

/// Required catalog columns
pub const PRODUCT_NAME_COLUMN: &str = "product_name";
pub const PRICE_CATEGORY_COLUMN: &str = "price_category";
pub const SKIN_TYPE_COLUMN: &str = "skin_type";

/// One CSV record plus the line it started on (1-based)
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split CSV text into records.
///
/// Blank lines are skipped. An unterminated quoted field is an error.
pub fn split_records(content: &str, file: &str) -> Result<Vec<CsvRecord>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut line = 1;
    let mut record_line = 1;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut fields), record_line);
                field_start = true;
                line += 1;
                record_line = line;
            }
            _ => {
                field.push(c);
                field_start = false;
            }
        }
    }

    if in_quotes {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: record_line,
            reason: "Unterminated quoted field".to_string(),
        });
    }

    // Last record without a trailing newline
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, fields, record_line);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<CsvRecord>, fields: Vec<String>, line: usize) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push(CsvRecord { line, fields });
    }
}

/// Column positions resolved once from the header row
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub width: usize,
    pub name: usize,
    pub price_category: usize,
    pub skin_type: usize,
    /// Index of each tone's `skin_tone_<key>` column, if the file has it
    pub skin_tones: [Option<usize>; 14],
}

impl ColumnLayout {
    /// Resolve column positions from the header.
    ///
    /// The three descriptive columns are required. Tone columns are
    /// optional: a missing tone column reads as 0 for every row.
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |column: &str| headers.iter().position(|h| h == column);
        let require = |column: &str| {
            find(column).ok_or_else(|| DataLoadError::MissingColumn {
                column: column.to_string(),
            })
        };

        let mut skin_tones = [None; 14];
        for tone in SkinTone::ALL {
            skin_tones[tone.index()] = find(tone.feature_column());
        }

        Ok(Self {
            width: headers.len(),
            name: require(PRODUCT_NAME_COLUMN)?,
            price_category: require(PRICE_CATEGORY_COLUMN)?,
            skin_type: require(SKIN_TYPE_COLUMN)?,
            skin_tones,
        })
    }
}

/// Turn one data record into a `ProductRecord`.
///
/// Short rows are padded with empty fields; rows longer than the header
/// are rejected. `skin_type` and `price_category` must match a known label
/// exactly or the product stays unclassified. An unreadable tone flag is
/// logged and read as 0.
pub fn parse_product(
    record: CsvRecord,
    position: usize,
    layout: &ColumnLayout,
) -> Result<ProductRecord> {
    let CsvRecord { line, mut fields } = record;

    if fields.len() > layout.width {
        return Err(DataLoadError::FieldCountMismatch {
            expected: layout.width,
            found: fields.len(),
            line,
        });
    }
    fields.resize(layout.width, String::new());

    let mut skin_tones = SkinToneSet::new();
    for tone in SkinTone::ALL {
        let Some(idx) = layout.skin_tones[tone.index()] else {
            continue;
        };
        match parse_flag(tone.feature_column(), &fields[idx]) {
            Ok(true) => skin_tones.insert(tone),
            Ok(false) => {}
            Err(e) => warn!("Line {}: {}; reading it as 0", line, e),
        }
    }

    Ok(ProductRecord {
        position,
        name: fields[layout.name].clone(),
        price_category: PriceCategory::from_catalog_value(&fields[layout.price_category]),
        skin_type: SkinType::from_catalog_value(&fields[layout.skin_type]),
        skin_tones,
        fields,
    })
}

/// Parse a one-hot indicator cell.
///
/// Accepts the spellings a dataframe export produces: `1`/`0`, `1.0`/`0.0`,
/// `True`/`False`, and empty for missing.
fn parse_flag(column: &str, value: &str) -> Result<bool> {
    let trimmed = value.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" | "false" => return Ok(false),
        "true" => return Ok(true),
        _ => {}
    }
    match trimmed.parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v != 0.0),
        _ => Err(DataLoadError::InvalidValue {
            field: column.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(record: &CsvRecord) -> Vec<&str> {
        record.fields.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_split_simple_records() {
        let records = split_records("a,b,c\n1,2,3\n", "test.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(fields(&records[1]), vec!["1", "2", "3"]);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_split_quoted_fields() {
        let content = "name,note\r\n\"Cream, Rich\",\"says \"\"wow\"\"\"\r\n\"multi\nline\",x";
        let records = split_records(content, "test.csv").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(fields(&records[1]), vec!["Cream, Rich", "says \"wow\""]);
        assert_eq!(fields(&records[2]), vec!["multi\nline", "x"]);
        assert_eq!(records[2].line, 3);
    }

    #[test]
    fn test_split_skips_bom_and_blank_lines() {
        let records = split_records("\u{feff}a,b\n\n1,2\n\n", "test.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(fields(&records[0]), vec!["a", "b"]);
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_split_keeps_empty_fields() {
        let records = split_records("a,b,c\n,,\n", "test.csv").unwrap();
        assert_eq!(fields(&records[1]), vec!["", "", ""]);
    }

    #[test]
    fn test_split_unterminated_quote() {
        let err = split_records("a,b\n\"open,1\n", "test.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("c", "1").unwrap());
        assert!(parse_flag("c", "1.0").unwrap());
        assert!(parse_flag("c", "True").unwrap());
        assert!(!parse_flag("c", "0").unwrap());
        assert!(!parse_flag("c", "0.0").unwrap());
        assert!(!parse_flag("c", "False").unwrap());
        assert!(!parse_flag("c", "").unwrap());
        assert!(parse_flag("c", "yes please").is_err());
    }

    #[test]
    fn test_unreadable_tone_flag_reads_as_zero() {
        let headers: Vec<String> = [
            "product_name",
            "price_category",
            "skin_type",
            "skin_tone_fair",
            "skin_tone_tan",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let layout = ColumnLayout::from_headers(&headers).unwrap();

        let record = CsvRecord {
            line: 2,
            fields: vec!["Glow".into(), "Low".into(), "Oily".into(), "yes".into(), "1".into()],
        };
        let product = parse_product(record, 0, &layout).unwrap();
        assert!(!product.suits_tone(SkinTone::Fair));
        assert!(product.suits_tone(SkinTone::Tan));
        assert_eq!(product.fields[3], "yes");
    }

    #[test]
    fn test_layout_requires_descriptive_columns() {
        let headers: Vec<String> = ["product_name", "skin_type"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = ColumnLayout::from_headers(&headers).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { column } if column == "price_category"));
    }

    #[test]
    fn test_parse_product() {
        let headers: Vec<String> = [
            "product_name",
            "price_category",
            "skin_type",
            "skin_tone_tan",
            "brand",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let layout = ColumnLayout::from_headers(&headers).unwrap();

        let record = CsvRecord {
            line: 2,
            fields: vec!["Glow".into(), "Low".into(), "Oily".into(), "1".into(), "Acme".into()],
        };
        let product = parse_product(record, 0, &layout).unwrap();
        assert_eq!(product.name, "Glow");
        assert_eq!(product.price_category, Some(PriceCategory::Low));
        assert_eq!(product.skin_type, Some(SkinType::Oily));
        assert!(product.suits_tone(SkinTone::Tan));
        assert_eq!(product.skin_tones.len(), 1);
        assert_eq!(product.fields[4], "Acme");
    }

    #[test]
    fn test_parse_product_unclassified_and_short_rows() {
        let headers: Vec<String> = ["product_name", "price_category", "skin_type", "brand"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let layout = ColumnLayout::from_headers(&headers).unwrap();

        let record = CsvRecord {
            line: 5,
            fields: vec!["Balm".into(), "".into(), "Normal".into()],
        };
        let product = parse_product(record, 3, &layout).unwrap();
        assert_eq!(product.position, 3);
        assert_eq!(product.price_category, None);
        assert_eq!(product.skin_type, None);
        assert_eq!(product.fields.len(), 4);

        let lowercase = CsvRecord {
            line: 7,
            fields: vec!["Gel".into(), "low".into(), "oily".into(), "".into()],
        };
        let product = parse_product(lowercase, 5, &layout).unwrap();
        assert_eq!(product.price_category, None);
        assert_eq!(product.skin_type, None);

        let long = CsvRecord {
            line: 6,
            fields: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
        };
        let err = parse_product(long, 4, &layout).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch { expected: 4, found: 5, line: 6 }
        ));
    }
}
