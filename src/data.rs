//! Observational data for objectives and constraints.

use crate::error::{Error, Result};

/// An immutable pair of query points and their observed outcomes.
///
/// Query points and observations are equal-length ordered sequences of
/// numeric rows; every query point row has the same width, as does every
/// observation row. A dataset is a plain value: growing one with
/// [`concat`](Self::concat) produces a new dataset and leaves both operands
/// untouched.
///
/// # Examples
///
/// ```
/// use asktell::Dataset;
///
/// let init = Dataset::new(vec![vec![0.0]], vec![vec![0.5]]).unwrap();
/// let new = Dataset::new(vec![vec![1.0]], vec![vec![0.7]]).unwrap();
///
/// let combined = init.concat(&new).unwrap();
/// assert_eq!(combined.len(), 2);
/// assert_eq!(init.len(), 1); // operands are unchanged
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    query_points: Vec<Vec<f64>>,
    observations: Vec<Vec<f64>>,
}

impl Dataset {
    /// Creates a dataset from query points and observations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetLengthMismatch`] if the two sequences have
    /// different lengths, or [`Error::DatasetDimensionMismatch`] if rows
    /// within either sequence have inconsistent widths.
    pub fn new(query_points: Vec<Vec<f64>>, observations: Vec<Vec<f64>>) -> Result<Self> {
        if query_points.len() != observations.len() {
            return Err(Error::DatasetLengthMismatch {
                query_points: query_points.len(),
                observations: observations.len(),
            });
        }
        check_uniform_width(&query_points)?;
        check_uniform_width(&observations)?;
        Ok(Self {
            query_points,
            observations,
        })
    }

    /// Returns the query point rows.
    #[must_use]
    pub fn query_points(&self) -> &[Vec<f64>] {
        &self.query_points
    }

    /// Returns the observation rows.
    #[must_use]
    pub fn observations(&self) -> &[Vec<f64>] {
        &self.observations
    }

    /// Returns the number of (query point, observation) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.query_points.len()
    }

    /// Returns `true` if the dataset holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_points.is_empty()
    }

    /// Returns a new dataset holding this dataset's rows followed by
    /// `other`'s rows.
    ///
    /// Neither operand is modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetDimensionMismatch`] if the operands' row
    /// widths differ. An empty operand imposes no width.
    pub fn concat(&self, other: &Dataset) -> Result<Self> {
        check_matching_width(&self.query_points, &other.query_points)?;
        check_matching_width(&self.observations, &other.observations)?;

        let mut query_points = self.query_points.clone();
        query_points.extend(other.query_points.iter().cloned());
        let mut observations = self.observations.clone();
        observations.extend(other.observations.iter().cloned());
        Ok(Self {
            query_points,
            observations,
        })
    }
}

fn check_uniform_width(rows: &[Vec<f64>]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for (row, values) in rows.iter().enumerate().skip(1) {
        if values.len() != first.len() {
            return Err(Error::DatasetDimensionMismatch {
                expected: first.len(),
                got: values.len(),
                row,
            });
        }
    }
    Ok(())
}

fn check_matching_width(left: &[Vec<f64>], right: &[Vec<f64>]) -> Result<()> {
    let (Some(expected), Some(got)) = (left.first(), right.first()) else {
        return Ok(());
    };
    if expected.len() != got.len() {
        return Err(Error::DatasetDimensionMismatch {
            expected: expected.len(),
            got: got.len(),
            row: 0,
        });
    }
    Ok(())
}
