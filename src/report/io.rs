use std::{
    fs,
    path::{Path, PathBuf},
};

use polars::{
    frame::DataFrame,
    prelude::{CsvWriter, SchemaRef, SerWriter},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{IoError, SortinoResult},
    report::polars_ext::DataFrameExt,
};

// ================================================================================================
// Traits
// ================================================================================================

/// Common interface of all tabular reports.
pub trait Report {
    fn as_df(&self) -> &DataFrame;

    fn as_df_mut(&mut self) -> &mut DataFrame;
}

pub trait ReportName {
    fn base_name(&self) -> String;

    fn filename(&self, ext: FileExtension) -> String {
        format!("{}.{}", self.base_name(), ext)
    }
}

pub trait ToSchema {
    /// Returns the canonical schema for this report type.
    fn to_schema() -> SchemaRef;
}

pub trait ToJson {
    /// Serializes the report to a `Value::Array` of row objects.
    fn to_json(&self) -> SortinoResult<Value>;
}

pub trait ToCsv {
    /// Writes the report to `<dir>/<base_name>.csv` and returns the path.
    ///
    /// Creates `dir` if missing and overwrites an existing file.
    fn to_csv(&self, dir: impl AsRef<Path>) -> SortinoResult<PathBuf>;
}

// ================================================================================================
// Blanket Implementations
// ================================================================================================

impl<T> ToJson for T
where
    T: Report + ToSchema,
{
    fn to_json(&self) -> SortinoResult<Value> {
        let rows = self.as_df().to_json_rows()?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

impl<T> ToCsv for T
where
    T: Report + ReportName + ToSchema,
{
    fn to_csv(&self, dir: impl AsRef<Path>) -> SortinoResult<PathBuf> {
        let dir = dir.as_ref();
        let file_path = dir.join(self.filename(FileExtension::Csv));

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                IoError::FileSystem(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = fs::File::create(&file_path).map_err(IoError::Io)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut self.as_df().clone())
            .map_err(|e| {
                IoError::WriteFailed(format!(
                    "Failed to write CSV to '{}': {e}",
                    file_path.display()
                ))
            })?;

        Ok(file_path)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum FileExtension {
    Csv,
    Json,
}
