//! Dense decoded matrix.
//!
//! Axis 0 indexes pixel columns (`nx / nb` of them) and axis 1 indexes data
//! rows in the order they appear in the file. Cells that were never written
//! hold the zero value of the dtype.

use ndarray::{Array2, Axis};

use crate::value::{Dtype, Value};

/// Decoded matrix tagged with its inferred element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    Bool(Array2<bool>),
    Int(Array2<i64>),
    Float(Array2<f64>),
    Str(Array2<String>),
}

impl Matrix {
    /// Zero-filled matrix of shape `(columns, rows)`.
    ///
    /// # Examples
    /// ```
    /// use xpmatrix_core::{Dtype, Matrix, Value};
    ///
    /// let matrix = Matrix::zeros(Dtype::Int, (3, 2));
    /// assert_eq!(matrix.shape(), (3, 2));
    /// assert_eq!(matrix.get(2, 1), Some(Value::Int(0)));
    /// ```
    pub fn zeros(dtype: Dtype, shape: (usize, usize)) -> Self {
        match dtype {
            Dtype::Bool => Matrix::Bool(Array2::default(shape)),
            Dtype::Int => Matrix::Int(Array2::default(shape)),
            Dtype::Float => Matrix::Float(Array2::default(shape)),
            Dtype::Str => Matrix::Str(Array2::default(shape)),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Matrix::Bool(_) => Dtype::Bool,
            Matrix::Int(_) => Dtype::Int,
            Matrix::Float(_) => Dtype::Float,
            Matrix::Str(_) => Dtype::Str,
        }
    }

    /// `(columns, rows)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Matrix::Bool(array) => array.dim(),
            Matrix::Int(array) => array.dim(),
            Matrix::Float(array) => array.dim(),
            Matrix::Str(array) => array.dim(),
        }
    }

    pub fn columns(&self) -> usize {
        self.shape().0
    }

    pub fn rows(&self) -> usize {
        self.shape().1
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Value> {
        match self {
            Matrix::Bool(array) => array.get((x, y)).map(|v| Value::Bool(*v)),
            Matrix::Int(array) => array.get((x, y)).map(|v| Value::Int(*v)),
            Matrix::Float(array) => array.get((x, y)).map(|v| Value::Float(*v)),
            Matrix::Str(array) => array.get((x, y)).map(|v| Value::Str(v.clone())),
        }
    }

    /// All columns of data row `y`.
    pub fn row(&self, y: usize) -> Option<Vec<Value>> {
        if y >= self.rows() {
            return None;
        }
        (0..self.columns()).map(|x| self.get(x, y)).collect()
    }

    /// Every data row in file order.
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        (0..self.rows())
            .filter_map(|y| self.row(y))
            .collect()
    }

    /// Mean over the columns of each data row.
    ///
    /// Booleans count as 0/1, so for an existence map this is the fraction
    /// of frames in which each row was present. String matrices have no
    /// mean; a matrix without columns yields `NaN` per row.
    ///
    /// # Examples
    /// ```
    /// use ndarray::array;
    /// use xpmatrix_core::Matrix;
    ///
    /// let matrix = Matrix::Bool(array![[true, false], [true, true], [false, false], [true, false]]);
    /// assert_eq!(matrix.row_means(), Some(vec![0.75, 0.25]));
    /// ```
    pub fn row_means(&self) -> Option<Vec<f64>> {
        let floats = match self {
            Matrix::Bool(array) => array.mapv(|v| if v { 1.0 } else { 0.0 }),
            Matrix::Int(array) => array.mapv(|v| v as f64),
            Matrix::Float(array) => array.clone(),
            Matrix::Str(_) => return None,
        };
        let columns = floats.len_of(Axis(0));
        let means = floats
            .sum_axis(Axis(0))
            .iter()
            .map(|sum| sum / columns as f64)
            .collect();
        Some(means)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::Matrix;
    use crate::value::{Dtype, Value};

    #[test]
    fn zeros_use_dtype_default() {
        assert_eq!(Matrix::zeros(Dtype::Bool, (1, 1)).get(0, 0), Some(Value::Bool(false)));
        assert_eq!(Matrix::zeros(Dtype::Float, (1, 1)).get(0, 0), Some(Value::Float(0.0)));
        assert_eq!(
            Matrix::zeros(Dtype::Str, (1, 1)).get(0, 0),
            Some(Value::Str(String::new()))
        );
    }

    #[test]
    fn rows_follow_axis_one() {
        // columns along axis 0, rows along axis 1
        let matrix = Matrix::Int(array![[0, 1], [1, 0], [2, 2]]);
        assert_eq!(matrix.shape(), (3, 2));
        assert_eq!(
            matrix.row(0),
            Some(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            matrix.to_rows(),
            vec![
                vec![Value::Int(0), Value::Int(1), Value::Int(2)],
                vec![Value::Int(1), Value::Int(0), Value::Int(2)],
            ]
        );
        assert_eq!(matrix.row(2), None);
        assert_eq!(matrix.get(3, 0), None);
    }

    #[test]
    fn row_means_skip_strings() {
        let matrix = Matrix::Str(array![[String::from("a")]]);
        assert_eq!(matrix.row_means(), None);

        let matrix = Matrix::Float(array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(matrix.row_means(), Some(vec![2.0, 3.0]));
    }

    #[test]
    fn row_means_without_columns_are_nan() {
        let matrix = Matrix::zeros(Dtype::Int, (0, 2));
        let means = matrix.row_means().expect("numeric means");
        assert_eq!(means.len(), 2);
        assert!(means.iter().all(|m| m.is_nan()));
    }
}
