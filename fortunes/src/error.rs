use crate::geometry::Vec2;

/// Failure modes surfaced by the sweep, per the error-handling design:
/// ingestion violations are rejected at site construction, geometric
/// impossibilities abort the current sweep, close-event rejection is not
/// an error at all (the predictor just declines to schedule an event).
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum GvdError {
    #[error("segment site endpoints {a:?} -> {b:?} are horizontal (equal y)")]
    HorizontalSegment { a: Vec2, b: Vec2 },

    #[error("no intercept found while {context}")]
    NoIntercept { context: &'static str },

    #[error("circumcenter of three colinear point sites does not exist")]
    DegenerateCircumcenter,
}

pub type GvdResult<T> = Result<T, GvdError>;
