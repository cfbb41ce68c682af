//! Presentation of Sortino outcomes. Nothing here feeds back into the
//! computation.

pub mod asset_returns;
pub mod io;
pub mod polars_ext;
pub mod sortino_report;
pub mod summary;
