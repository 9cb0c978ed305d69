//! The flat settings vector optimized by gradient descent.

use std::ops::Deref;

use crate::error::{NetworkError, Result};

/// Settings values paired with a mask of which entries may be updated.
///
/// Entries with `requires_grad == false` are constants: every optimizer leaves them
/// untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    values: Vec<f64>,
    requires_grad: Vec<bool>,
}

impl Settings {
    /// All entries trainable.
    pub fn new(values: Vec<f64>) -> Self {
        let requires_grad = vec![true; values.len()];
        Settings { values, requires_grad }
    }

    /// Overwrite `ids` with constant `values`, freezing them.
    pub fn fix(mut self, ids: &[usize], values: &[f64]) -> Result<Self> {
        if ids.len() != values.len() {
            return Err(NetworkError::DimensionMismatch(format!(
                "{} fixed setting ids but {} fixed settings",
                ids.len(),
                values.len()
            )));
        }
        for (&id, &value) in ids.iter().zip(values) {
            if id >= self.values.len() {
                return Err(NetworkError::DimensionMismatch(format!(
                    "fixed setting id {} out of range for {} settings",
                    id,
                    self.values.len()
                )));
            }
            self.values[id] = value;
            self.requires_grad[id] = false;
        }
        Ok(self)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn requires_grad(&self) -> &[bool] {
        &self.requires_grad
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for Settings {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Settings {
    fn from(values: Vec<f64>) -> Self {
        Settings::new(values)
    }
}

impl From<&[f64]> for Settings {
    fn from(values: &[f64]) -> Self {
        Settings::new(values.to_vec())
    }
}

impl From<f64> for Settings {
    fn from(value: f64) -> Self {
        Settings::new(vec![value])
    }
}
