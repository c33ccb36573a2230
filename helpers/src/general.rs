use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

/// InputValueError is used if some race option or parameter does not fulfill the posed
/// requirements, e.g., a track with less than three centerline points.
#[derive(Debug, Clone)]
pub struct InputValueError;

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value")
    }
}

impl Error for InputValueError {}

pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that sort the array x (stable sort, NaN values are treated as
/// equal to everything).
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    match order {
        SortOrder::Ascending => {
            idxs.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            idxs.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    };

    idxs
}

/// step_towards moves value towards target by at most max_step and returns the result.
pub fn step_towards(value: f64, target: f64, max_step: f64) -> f64 {
    let diff = target - value;

    if diff.abs() > max_step {
        value + max_step.copysign(diff)
    } else {
        target
    }
}
