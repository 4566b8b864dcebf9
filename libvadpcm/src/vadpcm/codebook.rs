use crate::core::types::{VadpcmError, VadpcmResult};

use super::{COEF_ONE, ROW_SAMPLES};

/// expanded coefficient matrix, `[predictor][row][col]` with `order + 8` columns
///
/// columns `0..order` weight the feedback samples, the rest weight the
/// residuals of the current row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionMatrix {
    order: usize,
    predictors: usize,
    coefs: Vec<i32>,
}

impl PredictionMatrix {
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn predictors(&self) -> usize {
        self.predictors
    }

    /// columns per row
    pub fn width(&self) -> usize {
        self.order + ROW_SAMPLES
    }

    /// one row of a predictor
    pub fn row(&self, predictor: usize, row: usize) -> &[i32] {
        let width = self.width();
        let start = (predictor * ROW_SAMPLES + row) * width;
        &self.coefs[start..start + width]
    }

    pub fn get(&self, predictor: usize, row: usize, col: usize) -> i32 {
        self.row(predictor, row)[col]
    }

    fn set(&mut self, predictor: usize, row: usize, col: usize, value: i32) {
        let width = self.width();
        self.coefs[(predictor * ROW_SAMPLES + row) * width + col] = value;
    }
}

/// expand a raw big-endian coefficient table into the prediction matrix
pub fn expand_codebook(
    order: usize,
    predictors: usize,
    table: &[u8],
) -> VadpcmResult<PredictionMatrix> {
    let needed = order * predictors * ROW_SAMPLES * 2;
    if table.len() < needed {
        return Err(VadpcmError::MalformedContainer(format!(
            "codebook table is {} bytes, order {} x {} predictors needs {}",
            table.len(),
            order,
            predictors,
            needed
        )));
    }

    let width = order + ROW_SAMPLES;
    let mut matrix = PredictionMatrix {
        order,
        predictors,
        coefs: vec![0; predictors * ROW_SAMPLES * width],
    };

    let mut values = table
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]) as i32);

    for p in 0..predictors {
        // stored column-major
        for col in 0..order {
            for row in 0..ROW_SAMPLES {
                let value = values.next().unwrap_or(0);
                matrix.set(p, row, col, value);
            }
        }

        // residual columns: each diagonal repeats one value
        for j in 0..ROW_SAMPLES {
            let v = if j == 0 {
                COEF_ONE
            } else {
                matrix.get(p, j - 1, order - 1)
            };
            for (row, col) in (j..ROW_SAMPLES).zip(order..width) {
                matrix.set(p, row, col, v);
            }
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_diagonal() {
        let matrix = expand_codebook(2, 1, &[0; 32]).unwrap();
        for row in 0..8 {
            assert_eq!(matrix.get(0, row, 2 + row), 2048);
            for col in 3 + row..10 {
                assert_eq!(matrix.get(0, row, col), 0);
            }
        }
    }

    #[test]
    fn test_multiple_predictors() {
        let mut table = vec![0u8; 64];
        // predictor 1, column 1, row 0
        table[32 + 16] = 0x01;
        let matrix = expand_codebook(2, 2, &table).unwrap();
        assert_eq!(matrix.get(0, 0, 1), 0);
        assert_eq!(matrix.get(1, 0, 1), 256);
        // row 1 picks up row 0's last feedback coefficient
        assert_eq!(matrix.get(1, 1, 2), 256);
        assert_eq!(matrix.get(1, 7, 8), 256);
    }
}
