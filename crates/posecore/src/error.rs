//! Errors raised while validating incoming samples.

/// A sample that cannot be trusted for display.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    /// A field is NaN or infinite
    #[error("non-finite value for {field}: {value}")]
    NonFinite {
        field: &'static str,
        value: f64,
    },

    /// A coordinate lies implausibly far from the field
    #[error("{field} = {value} exceeds the ±{limit} m coordinate limit")]
    OutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },
}
