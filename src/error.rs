use std::fmt;

#[derive(Debug)]
pub enum MsortError {
    /// More tasks submitted than the queue was sized for.
    QueueFull { capacity: usize },
    /// Submit attempted after shutdown was requested.
    PoolShutDown,
    /// Pool misconfiguration (zero threads, zero capacity).
    Pool(String),
    /// Sort requested on a length that is not a power of two.
    NotPowerOfTwo(usize),
    /// One or more merge tasks panicked; the buffer contents are unspecified.
    TaskFailed { failed: u64 },
    /// The orchestrator reported failure; carries its rendered cause.
    Sort(String),
    /// Input file held more integers than the supported capacity.
    InputTooLarge { found: usize, max: usize },
    /// Input file held no integers at all.
    EmptyInput,
    ParseInput(String),
    Io(std::io::Error),
}

impl fmt::Display for MsortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MsortError::QueueFull { capacity } => {
                write!(f, "Task queue full: capacity {} exceeded", capacity)
            }
            MsortError::PoolShutDown => write!(f, "Thread pool is shut down"),
            MsortError::Pool(e) => write!(f, "Thread pool error: {}", e),
            MsortError::NotPowerOfTwo(n) => {
                write!(f, "Sort requires a power-of-two length, got {}", n)
            }
            MsortError::TaskFailed { failed } => {
                write!(f, "{} merge task(s) failed", failed)
            }
            MsortError::Sort(e) => write!(f, "Sort failed: {}", e),
            MsortError::InputTooLarge { found, max } => {
                write!(f, "Input has {} integers, maximum is {}", found, max)
            }
            MsortError::EmptyInput => write!(f, "Input file contains no integers"),
            MsortError::ParseInput(e) => write!(f, "Parse error: {}", e),
            MsortError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for MsortError {}

impl From<std::io::Error> for MsortError {
    fn from(err: std::io::Error) -> Self {
        MsortError::Io(err)
    }
}

impl From<std::num::ParseIntError> for MsortError {
    fn from(err: std::num::ParseIntError) -> Self {
        MsortError::ParseInput(err.to_string())
    }
}
