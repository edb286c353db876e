//! SQL Server type mapping to JSON-safe scalar values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tiberius::{ColumnType, Row};
use uuid::Uuid;

/// A SQL value that can be serialized to JSON.
///
/// Binary values serialize as `0x`-prefixed hex text, decimals as strings,
/// GUIDs and temporal values as ISO strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(#[serde(serialize_with = "hex::serialize")] Vec<u8>),
    Decimal(Decimal),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
}

impl SqlValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Borrow the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to a display string.
    pub fn to_display_string(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::F32(v) => v.to_string(),
            SqlValue::F64(v) => v.to_string(),
            SqlValue::String(v) => v.clone(),
            SqlValue::Bytes(v) => hex::encode(v),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::Uuid(v) => v.to_string(),
            SqlValue::Date(v) => v.to_string(),
            SqlValue::Time(v) => v.to_string(),
            SqlValue::DateTime(v) => v.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            SqlValue::DateTimeOffset(v) => v.to_rfc3339(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

/// Type mapper for converting SQL Server column values.
pub struct TypeMapper;

impl TypeMapper {
    /// Extract every column of a row, in column order.
    pub fn row_values(row: &Row) -> Vec<SqlValue> {
        (0..row.columns().len())
            .map(|idx| Self::extract_column(row, idx))
            .collect()
    }

    /// Extract a value from a Tiberius row column.
    ///
    /// Values that cannot be converted come back as `Null`.
    pub fn extract_column(row: &Row, idx: usize) -> SqlValue {
        let Some(col) = row.columns().get(idx) else {
            return SqlValue::Null;
        };

        match col.column_type() {
            ColumnType::Null => SqlValue::Null,
            ColumnType::Bit | ColumnType::Bitn => get(row, idx, SqlValue::Bool),
            ColumnType::Int1 => get::<u8, _>(row, idx, |v| SqlValue::I16(i16::from(v))),
            ColumnType::Int2 => get(row, idx, SqlValue::I16),
            ColumnType::Int4 => get(row, idx, SqlValue::I32),
            ColumnType::Int8 => get(row, idx, SqlValue::I64),
            ColumnType::Intn => first_of(
                row,
                idx,
                &[
                    |r, i| try_value(r, i, SqlValue::I32),
                    |r, i| try_value(r, i, SqlValue::I64),
                    |r, i| try_value(r, i, SqlValue::I16),
                    |r, i| try_value::<u8, _>(r, i, |v| SqlValue::I16(i16::from(v))),
                ],
            ),
            ColumnType::Float4 => get(row, idx, SqlValue::F32),
            ColumnType::Float8 | ColumnType::Money | ColumnType::Money4 => {
                get(row, idx, SqlValue::F64)
            }
            ColumnType::Floatn => first_of(
                row,
                idx,
                &[
                    |r, i| try_value(r, i, SqlValue::F64),
                    |r, i| try_value(r, i, SqlValue::F32),
                ],
            ),
            ColumnType::Decimaln | ColumnType::Numericn => get(row, idx, SqlValue::Decimal),
            ColumnType::Guid => get(row, idx, SqlValue::Uuid),
            ColumnType::Daten => get(row, idx, SqlValue::Date),
            ColumnType::Timen => get(row, idx, SqlValue::Time),
            ColumnType::Datetime
            | ColumnType::Datetime4
            | ColumnType::Datetimen
            | ColumnType::Datetime2 => get(row, idx, SqlValue::DateTime),
            ColumnType::DatetimeOffsetn => get(row, idx, SqlValue::DateTimeOffset),
            ColumnType::BigVarBin | ColumnType::BigBinary | ColumnType::Image => {
                get::<&[u8], _>(row, idx, |v| SqlValue::Bytes(v.to_vec()))
            }
            ColumnType::Xml => get::<&tiberius::xml::XmlData, _>(row, idx, |v| {
                SqlValue::String(v.to_owned().into_string())
            }),
            ColumnType::BigVarChar
            | ColumnType::BigChar
            | ColumnType::NVarchar
            | ColumnType::NChar
            | ColumnType::Text
            | ColumnType::NText => get::<&str, _>(row, idx, |v| SqlValue::String(v.to_string())),
            _ => first_of(
                row,
                idx,
                &[
                    |r, i| try_value::<&str, _>(r, i, |v| SqlValue::String(v.to_string())),
                    |r, i| try_value(r, i, SqlValue::I64),
                    |r, i| try_value(r, i, SqlValue::F64),
                    |r, i| try_value::<&[u8], _>(r, i, |v| SqlValue::Bytes(v.to_vec())),
                ],
            ),
        }
    }

    /// Get the SQL type name for a column.
    pub fn sql_type_name(col: &tiberius::Column) -> &'static str {
        match col.column_type() {
            ColumnType::Null => "NULL",
            ColumnType::Int1 => "TINYINT",
            ColumnType::Int2 => "SMALLINT",
            ColumnType::Int4 => "INT",
            ColumnType::Int8 => "BIGINT",
            ColumnType::Float4 => "REAL",
            ColumnType::Float8 => "FLOAT",
            ColumnType::Money => "MONEY",
            ColumnType::Money4 => "SMALLMONEY",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Datetime4 => "SMALLDATETIME",
            ColumnType::Bit | ColumnType::Bitn => "BIT",
            ColumnType::Guid => "UNIQUEIDENTIFIER",
            ColumnType::Decimaln => "DECIMAL",
            ColumnType::Numericn => "NUMERIC",
            ColumnType::Intn => "INT",
            ColumnType::Floatn => "FLOAT",
            ColumnType::Datetimen => "DATETIME",
            ColumnType::Daten => "DATE",
            ColumnType::Timen => "TIME",
            ColumnType::Datetime2 => "DATETIME2",
            ColumnType::DatetimeOffsetn => "DATETIMEOFFSET",
            ColumnType::BigVarBin => "VARBINARY",
            ColumnType::BigVarChar => "VARCHAR",
            ColumnType::BigBinary => "BINARY",
            ColumnType::BigChar => "CHAR",
            ColumnType::NVarchar => "NVARCHAR",
            ColumnType::NChar => "NCHAR",
            ColumnType::Xml => "XML",
            ColumnType::Text => "TEXT",
            ColumnType::Image => "IMAGE",
            ColumnType::NText => "NTEXT",
            ColumnType::SSVariant => "SQL_VARIANT",
            _ => "UNKNOWN",
        }
    }
}

type Extractor = fn(&Row, usize) -> Option<SqlValue>;

/// Read column `idx` as `T`. A SQL NULL or a failed conversion gives `None`.
fn try_value<'a, T, F>(row: &'a Row, idx: usize, wrap: F) -> Option<SqlValue>
where
    T: tiberius::FromSql<'a>,
    F: FnOnce(T) -> SqlValue,
{
    row.try_get::<T, _>(idx).ok().flatten().map(wrap)
}

fn get<'a, T, F>(row: &'a Row, idx: usize, wrap: F) -> SqlValue
where
    T: tiberius::FromSql<'a>,
    F: FnOnce(T) -> SqlValue,
{
    try_value(row, idx, wrap).unwrap_or(SqlValue::Null)
}

fn first_of(row: &Row, idx: usize, extractors: &[Extractor]) -> SqlValue {
    extractors
        .iter()
        .find_map(|extract| extract(row, idx))
        .unwrap_or(SqlValue::Null)
}

/// Hex encoding helper (minimal implementation to avoid extra dependency).
mod hex {
    use serde::Serializer;

    pub fn encode(bytes: &[u8]) -> String {
        let digits: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        format!("0x{}", digits)
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(bytes))
    }
}
