use thiserror::Error;

/// Failure modes across data loading and query answering.
///
/// Errors raised during construction (config, zones, hash index, aggregate
/// type) are fatal. Errors raised while answering a query are logged and
/// folded into the `-1.0` sentinel at the public boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("zones file {path}: {reason}")]
    ZoneFileParse { path: String, reason: String },

    #[error("hash index {path}: {reason}")]
    IndexFormat { path: String, reason: String },

    #[error("no aggregate entry for key {0:?}")]
    KeyNotFound(String),

    #[error("no zone contains point ({lon}, {lat})")]
    ZoneNotFound { lon: f64, lat: f64 },

    #[error("bad timestamp {0:?}, expected YYYY-MM-DD HH:MM:SS")]
    BadTimestamp(String),

    #[error("unknown aggregate type {0:?}, expected \"min_max\", \"min_med_max\" or \"percentiles\"")]
    BadAggregateType(String),

    #[error("ETA table {path}: {reason}")]
    EtaTableIo { path: String, reason: String },

    #[error("routing engine unavailable: {0}")]
    RoutingUnavailable(String),

    #[error("unexpected routing engine response: {0}")]
    ProtocolParse(String),
}
