use thiserror::Error;

/// Convenient result alias for the voyage core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type. Every variant carries the structured
/// context a caller needs to build an HTTP problem response without
/// matching on the rendered message.
#[derive(Debug, Error)]
pub enum Error {
    /// Start or end point has no navigable water cell within the snap radius.
    #[error("{point} ({lat}, {lon}) is off the navigable grid")]
    OffGrid {
        point: OffGridPoint,
        lat: f64,
        lon: f64,
    },

    /// A* exhausted its node or time budget with no route.
    #[error("no path found between ({from_lat}, {from_lon}) and ({to_lat}, {to_lon}): {cause}")]
    NoPath {
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
        cause: NoPathCause,
    },

    /// An intermediate coarse segment failed; carries the segment index so
    /// the orchestrator can decide whether to demote this to a warning.
    #[error("segment {index} failed: {source}")]
    SegmentFailed {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// The grid store could not serve cells for the requested region.
    #[error("grid store unavailable: {reason}")]
    GridUnavailable { reason: String },

    /// Some weather samples failed; the route is still returned.
    #[error("{failed} of {attempted} weather samples failed")]
    WeatherFetchPartial { failed: usize, attempted: usize },

    /// Live weather updates are disabled by configuration.
    #[error("live weather updates are disabled")]
    WeatherFetchDisabled,

    /// Transient rate limiting from the external weather source.
    #[error("weather source rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// The request failed validation before any routing was attempted.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Raised when encoding or decoding a grid snapshot fails.
    #[error("grid snapshot {op} failed: {message}")]
    SnapshotCodec { op: &'static str, message: String },
}

/// Which endpoint of a request fell off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffGridPoint {
    Start,
    End,
}

impl std::fmt::Display for OffGridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OffGridPoint::Start => write!(f, "start"),
            OffGridPoint::End => write!(f, "end"),
        }
    }
}

/// Why the fine planner failed to find a path for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPathCause {
    /// Search exhausted the configured node budget.
    NodeLimitExceeded,
    /// Search exceeded the configured wall-clock budget.
    TimedOut,
    /// The corridor contained no navigable cells at all.
    CorridorEmpty,
    /// Start and goal are on disconnected water bodies within the corridor.
    DisconnectedBasin,
}

impl std::fmt::Display for NoPathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            NoPathCause::NodeLimitExceeded => "node limit exceeded",
            NoPathCause::TimedOut => "wall-clock limit exceeded",
            NoPathCause::CorridorEmpty => "corridor contained no navigable cells",
            NoPathCause::DisconnectedBasin => "blocked by land, disconnected basin",
        };
        write!(f, "{msg}")
    }
}

impl Error {
    /// True when this error should never fail a route outright (it only
    /// degrades reported metrics).
    pub fn is_weather_only(&self) -> bool {
        matches!(
            self,
            Error::WeatherFetchPartial { .. }
                | Error::WeatherFetchDisabled
                | Error::RateLimited { .. }
        )
    }
}
