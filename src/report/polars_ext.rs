use polars::prelude::{DataFrame, JsonFormat, JsonWriter, SerWriter};
use serde_json::Value;

use crate::error::{DataError, IoError, SortinoError, SortinoResult};

pub(super) fn polars_to_sortino_error(report: &str, e: polars::error::PolarsError) -> SortinoError {
    SortinoError::Data(DataError::DataFrame(format!(
        "Error while building {report}: {e}"
    )))
}

pub trait DataFrameExt {
    fn to_json_rows(&self) -> SortinoResult<Vec<serde_json::Map<String, Value>>>;
}

impl DataFrameExt for DataFrame {
    fn to_json_rows(&self) -> SortinoResult<Vec<serde_json::Map<String, Value>>> {
        let height = self.height();
        if height == 0 {
            return Ok(Vec::new());
        }

        // Roughly 2^6 bytes per cell
        let mut buf = Vec::with_capacity(height * self.width() * (1 << 6));

        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut self.clone())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        match serde_json::from_slice(&buf).map_err(IoError::Json)? {
            Value::Array(rows) => Ok(rows
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            _ => {
                Err(DataError::DataFrame("Polars JSON output was not an array".to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use super::*;

    #[test]
    fn test_to_json_rows_keeps_nulls_and_order() {
        let df = df![
            "portfolio" => &["a", "b"],
            "sortino_ratio" => &[Some(1.1547), None],
        ]
        .expect("Failed to create DF");

        let rows = df.to_json_rows().expect("serializable");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["portfolio"], "a");
        assert_eq!(rows[0]["sortino_ratio"], 1.1547);
        assert_eq!(rows[1]["sortino_ratio"], Value::Null);
    }

    #[test]
    fn test_empty_frame_yields_no_rows() {
        let df = DataFrame::empty();
        assert!(df.to_json_rows().expect("empty is fine").is_empty());
    }
}
