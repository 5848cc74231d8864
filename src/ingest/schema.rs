use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
/// Cell markers read as missing values, like pandas' default NA strings.
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "#N/A", "NaN", "nan", "NULL", "null"];

/// Primitive type tag inferred from raw cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Date,
    Text,
}

impl DataType {
    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Integer => "int",
            DataType::Float => "float",
            DataType::Boolean => "bool",
            DataType::Date => "date",
            DataType::Text => "text",
        }
    }

    /// Classifies a single non-empty cell.
    pub fn infer(value: &str) -> DataType {
        let value = value.trim();

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            DataType::Boolean
        } else if value.parse::<i64>().is_ok() {
            DataType::Integer
        } else if value.parse::<f64>().is_ok_and(f64::is_finite) {
            DataType::Float
        } else if is_date_like(value) {
            DataType::Date
        } else {
            DataType::Text
        }
    }

    /// Empty cells and NA markers carry no type evidence.
    pub fn is_missing(value: &str) -> bool {
        let value = value.trim();
        value.is_empty() || MISSING_MARKERS.contains(&value)
    }

    /// Smallest type able to hold values of both `self` and `other`.
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
                DataType::Float
            }
            _ => DataType::Text,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn is_date_like(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `[id, name, salary]`
    pub fn column_list(&self) -> String {
        format!("[{}]", self.column_names().join(", "))
    }

    /// `{id: int, name: text, salary: float}`
    pub fn type_map(&self) -> String {
        let entries: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}: {}", c.name, c.data_type))
            .collect();

        format!("{{{}}}", entries.join(", "))
    }
}
