//! Cell → `grid_points × horizon` matrix coercion.
//!
//! A cell may hold a flat vector or any rectangular nesting of numbers; it is
//! flattened in row-major order and reshaped so that row `g` holds the
//! forecast days of grid point `g`. The horizon is inferred from the length
//! and may be shorter than the configured maximum (truncated predictions).

use fe_core::GridShape;
use nalgebra::DMatrix;

use crate::cell::Cell;

/// Why a cell could not be coerced. Each variant drops one row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReshapeError {
    #[error("cell is null")]
    NullCell,

    #[error("cell is a {0}, expected a numeric sequence")]
    NotASequence(&'static str),

    #[error("cell is an empty sequence")]
    Empty,

    #[error("ragged nesting: expected sub-shape {expected:?}, got {got:?}")]
    Ragged { expected: Vec<usize>, got: Vec<usize> },

    #[error("element {index} is {kind}, expected a number")]
    NonNumeric { index: usize, kind: &'static str },

    #[error("{len} values cannot be split over {grid_points} grid points")]
    FlatLength { len: usize, grid_points: usize },

    #[error("horizon of {got} days exceeds the maximum of {max}")]
    HorizonTooLong { got: usize, max: usize },
}

impl From<ReshapeError> for fe_core::Error {
    fn from(e: ReshapeError) -> Self {
        fe_core::Error::Reshape(e.to_string())
    }
}

/// Flatten a rectangular numeric cell in row-major order.
///
/// Returns the values and the nesting shape (`[n]` for a flat vector,
/// `[rows, cols]` for a matrix, ...).
pub fn flatten_numeric(cell: &Cell) -> Result<(Vec<f64>, Vec<usize>), ReshapeError> {
    match cell {
        Cell::Null => return Err(ReshapeError::NullCell),
        Cell::List(_) => {}
        other => return Err(ReshapeError::NotASequence(other.kind())),
    }
    let dims = nesting_shape(cell)?;
    let len: usize = dims.iter().product();
    if len == 0 {
        return Err(ReshapeError::Empty);
    }
    let mut out = Vec::with_capacity(len);
    flatten_into(cell, &mut out)?;
    Ok((out, dims))
}

/// Coerce a cell into a `grid_points × h` matrix with `1 <= h <= horizon_days`.
pub fn coerce_matrix(cell: &Cell, shape: &GridShape) -> Result<DMatrix<f64>, ReshapeError> {
    let (values, _) = flatten_numeric(cell)?;
    let len = values.len();
    if len % shape.grid_points != 0 {
        return Err(ReshapeError::FlatLength { len, grid_points: shape.grid_points });
    }
    let h = len / shape.grid_points;
    if h > shape.horizon_days {
        return Err(ReshapeError::HorizonTooLong { got: h, max: shape.horizon_days });
    }
    debug_assert_eq!(shape.horizon_of_flat_len(len), Some(h));
    Ok(DMatrix::from_row_slice(shape.grid_points, h, &values))
}

fn nesting_shape(cell: &Cell) -> Result<Vec<usize>, ReshapeError> {
    let Cell::List(items) = cell else {
        return Ok(vec![]);
    };
    let Some(first) = items.first() else {
        return Ok(vec![0]);
    };
    let inner = nesting_shape(first)?;
    for item in &items[1..] {
        let got = nesting_shape(item)?;
        if got != inner {
            return Err(ReshapeError::Ragged { expected: inner, got });
        }
    }
    let mut dims = Vec::with_capacity(inner.len() + 1);
    dims.push(items.len());
    dims.extend(inner);
    Ok(dims)
}

fn flatten_into(cell: &Cell, out: &mut Vec<f64>) -> Result<(), ReshapeError> {
    match cell {
        Cell::List(items) => {
            for item in items {
                flatten_into(item, out)?;
            }
            Ok(())
        }
        scalar => {
            let x = scalar
                .as_f64()
                .ok_or(ReshapeError::NonNumeric { index: out.len(), kind: scalar.kind() })?;
            out.push(x);
            Ok(())
        }
    }
}
