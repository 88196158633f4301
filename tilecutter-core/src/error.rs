//! Error and Result types.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TcError {
    // GeomProcessor
    #[error("processing geometry `{0}`")]
    Geometry(String),

    // Feature ingestion
    #[error("processing feature property: `{0}`")]
    Property(String),

    // Vector-tile encoding
    #[error("MVT encoding error `{0}`")]
    Mvt(String),

    // Tile archive
    #[error("tile archive error `{0}`")]
    Archive(String),

    #[error("did not read any valid geometries")]
    EmptyInput,

    #[error("GeoJSON error `{0}`")]
    GeoJson(String),

    #[error("I/O error `{0}`")]
    Io(#[from] std::io::Error),
}

impl From<geojson::Error> for TcError {
    fn from(err: geojson::Error) -> Self {
        TcError::GeoJson(err.to_string())
    }
}

impl From<serde_json::Error> for TcError {
    fn from(err: serde_json::Error) -> Self {
        TcError::GeoJson(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TcError>;

#[test]
fn error_message() {
    assert_eq!(
        TcError::Geometry("test".to_string()).to_string(),
        "processing geometry `test`".to_string()
    );
}
