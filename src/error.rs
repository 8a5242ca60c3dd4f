use thiserror::Error;

/// Failures of the field aggregation itself.
///
/// Infeasible rewards are not represented here: they become sentinel pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("invalid resolution: nside={nside} must be in 1..=2^29 with an allocatable pixel count")]
    InvalidResolution { nside: i64 },
    #[error("pixel index {index} out of range for npix={npix}")]
    PixelIndexOutOfRange { index: i64, npix: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid datetime: {0}")]
    Datetime(#[from] chrono::ParseError),
    #[error("no surveys in tier {0}")]
    UnknownTier(usize),
    #[error("tier {tier} has no survey {index}")]
    UnknownSurvey { tier: usize, index: usize },
    #[error("survey '{survey}' has no map named '{map}'")]
    UnknownMap { survey: String, map: String },
    #[error("survey '{survey}' has no basis function {index}")]
    UnknownBasisFunction { survey: String, index: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
