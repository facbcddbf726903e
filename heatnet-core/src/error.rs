use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No buildings supplied: cannot build a heating network without consumers")]
    NoBuildings,
    #[error("No streets supplied: street-based routing needs at least one street segment")]
    NoStreets,
    #[error("Street graph has no edges to insert a point into")]
    NoEdges,
    #[error("Invalid node key")]
    InvalidNodeKey,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
