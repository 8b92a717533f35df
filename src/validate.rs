//! Request validation.
//!
//! Checks run in a fixed order and the first violated rule is reported:
//! required fields, date format, aggregation function, matrix. Nothing here
//! touches the database.

use chrono::NaiveDate;

use crate::error::{CoviscopeError, Result};
use crate::models::{Aggregation, ChartParams, ChartRequest, ChartVariant, Matrix};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate a raw request for the given chart variant.
///
/// Returns the typed parameters on success, or
/// [`CoviscopeError::Validation`] naming the first rule that failed.
///
/// `start_date > end_date` is accepted; the query simply matches no rows.
pub fn validate(req: &ChartRequest, variant: ChartVariant) -> Result<ChartParams> {
    let start_date = non_empty(&req.start_date);
    let end_date = non_empty(&req.end_date);
    let matrix = non_empty(&req.matrix);
    let aggregation_func = non_empty(&req.aggregation_func);

    let (start_date, end_date, matrix) = match (start_date, end_date, matrix) {
        (Some(s), Some(e), Some(m))
            if !variant.accepts_aggregation() || aggregation_func.is_some() =>
        {
            (s, e, m)
        }
        _ => return Err(missing_params(variant)),
    };

    let start_date = parse_date(start_date)
        .ok_or_else(|| invalid("invalid start_date format (expected YYYY-MM-DD)"))?;
    let end_date = parse_date(end_date)
        .ok_or_else(|| invalid("invalid end_date format (expected YYYY-MM-DD)"))?;

    // The per-country chart always sums; any supplied function is ignored.
    let aggregation = match aggregation_func {
        Some(name) if variant.accepts_aggregation() => {
            name.parse::<Aggregation>().map_err(|_| {
                invalid("invalid aggregation function name: (expected one of: sum, avg, max, min)")
            })?
        }
        _ => Aggregation::Sum,
    };

    let matrix = matrix.parse::<Matrix>().map_err(|_| {
        invalid(
            "invalid matrix name: (expected one of: new_confirmed, new_deceased, cumulative_confirmed)",
        )
    })?;

    Ok(ChartParams {
        variant,
        start_date,
        end_date,
        aggregation,
        matrix,
        countries: req.countries.clone().unwrap_or_default(),
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Strict `YYYY-MM-DD`: ASCII digits with `-` at offsets 4 and 7 only.
///
/// chrono alone would accept unpadded fields, leading spaces before a
/// number and a signed year.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let well_formed = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn missing_params(variant: ChartVariant) -> CoviscopeError {
    if variant.accepts_aggregation() {
        invalid("missing required parameters: start_date, end_date, aggregation_func, matrix")
    } else {
        invalid("missing required parameters: start_date, end_date, matrix")
    }
}

fn invalid(msg: &str) -> CoviscopeError {
    CoviscopeError::Validation(msg.to_string())
}
