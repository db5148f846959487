use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("OutOfRange: {name} must be between 1 and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        max: i64,
    },
}

impl IntoResponse for ParamError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Applies `default` when absent and rejects values outside `1..=max`.
pub fn bounded(
    name: &'static str,
    value: Option<i64>,
    default: i64,
    max: i64,
) -> Result<i64, ParamError> {
    match value.unwrap_or(default) {
        value if (1..=max).contains(&value) => Ok(value),
        value => Err(ParamError::OutOfRange { name, value, max }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_applies_when_absent() {
        assert_eq!(bounded("limit", None, 20, 100).unwrap(), 20);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(bounded("limit", Some(1), 20, 100).unwrap(), 1);
        assert_eq!(bounded("limit", Some(100), 20, 100).unwrap(), 100);
    }

    #[test]
    fn out_of_range_is_rejected() {
        for value in [0, -5, 101] {
            let err = bounded("limit", Some(value), 20, 100).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("OutOfRange: limit must be between 1 and 100, got {value}")
            );
        }
    }
}
