use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no candidate distribution could be fitted to sample '{0}'")]
    Calibration(String),
    #[error("sample '{0}' contains no usable positive values")]
    EmptySample(String),
    #[error("call {call} could not be classified: {reason}")]
    Classification { call: usize, reason: String },
    #[error("units must not be empty")]
    NoUnits,
    #[error("unit capacity must be greater than 0 (got {0})")]
    InvalidCapacity(i64),
    #[error("duplicate unit capacity {0}")]
    DuplicateCapacity(u32),
    #[error("calls must be greater than 0")]
    CallsZero,
    #[error("simple triage factor must be finite and not negative (got {0})")]
    InvalidTriageFactor(f64),
    #[error("event budget exhausted after {processed} events in scenario with {capacity} units")]
    EventBudget { capacity: u32, processed: u64 },
    #[error("{0}")]
    SampleIo(String),
    #[error("{0}")]
    SampleParse(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
