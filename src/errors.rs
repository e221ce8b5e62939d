use std::error::Error;
use std::fmt;

/// All errors which may be returned by this simulation engine.
///
/// Configuration errors are returned at construction time so a flight
/// never starts in an invalid state. `NonFinite` is the fail-fast path
/// for unrecoverable numerical states (e.g. NaN creeping into the
/// velocity vector); everything else is an anomaly that is detected,
/// logged, and recovered locally instead of raising an error (see the
/// module-level docs on `projectile` and `stats`).
#[derive(Debug)]
pub enum SimError {
    /// A construction-time configuration problem: non-positive dt,
    /// non-positive mass, a missing atmosphere layer override, etc.
    Configuration(String),
    /// A state variable that must be finite was NaN or infinite.
    NonFinite { field: &'static str, value: f64 },
    Io(std::io::Error),
    Csv(csv::Error),
    Zip(zip::result::ZipError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            SimError::NonFinite { field, value } => {
                write!(f, "non-finite value in `{}`: {}", field, value)
            }
            SimError::Io(e) => write!(f, "I/O error: {}", e),
            SimError::Csv(e) => write!(f, "CSV error: {}", e),
            SimError::Zip(e) => write!(f, "zip error: {}", e),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimError::Io(e) => Some(e),
            SimError::Csv(e) => Some(e),
            SimError::Zip(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<csv::Error> for SimError {
    fn from(e: csv::Error) -> Self {
        SimError::Csv(e)
    }
}

impl From<zip::result::ZipError> for SimError {
    fn from(e: zip::result::ZipError) -> Self {
        SimError::Zip(e)
    }
}

/// Fail fast if `value` is not finite, naming the offending field so the
/// driver can report which state variable broke (spec'd in the error
/// handling policy: unrecoverable conditions must fail fast and name the
/// offending state variable).
pub fn require_finite(field: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::NonFinite { field, value })
    }
}
