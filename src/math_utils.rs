// src/math_utils.rs
use burn::tensor::{backend::Backend, ElementConversion, Tensor, TensorData};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Squared Euclidean norm of every row
pub fn row_sq_norms(x: ArrayView2<f64>) -> Array1<f64> {
    x.map_axis(Axis(1), |row| row.dot(&row))
}

/// Sum of every row
pub fn row_sums(x: ArrayView2<f64>) -> Array1<f64> {
    x.sum_axis(Axis(1))
}

/// Row-wise sum of a `[batch, d]` tensor, shape `[batch]`
pub fn tensor_row_sums<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 1> {
    let [rows, _] = x.dims();
    x.sum_dim(1).reshape([rows])
}

pub fn tensor_from_array1<B: Backend>(a: ArrayView1<f64>, device: &B::Device) -> Tensor<B, 1> {
    let data = TensorData::new(a.iter().copied().collect::<Vec<f64>>(), [a.len()]);
    Tensor::from_data(data.convert::<B::FloatElem>(), device)
}

pub fn tensor_from_array2<B: Backend>(a: ArrayView2<f64>, device: &B::Device) -> Tensor<B, 2> {
    let (rows, cols) = a.dim();
    let data = TensorData::new(a.iter().copied().collect::<Vec<f64>>(), [rows, cols]);
    Tensor::from_data(data.convert::<B::FloatElem>(), device)
}

pub fn tensor_to_array1<B: Backend>(t: Tensor<B, 1>) -> Array1<f64> {
    t.into_data().iter::<f64>().collect()
}

pub fn tensor_to_array2<B: Backend>(t: Tensor<B, 2>) -> Array2<f64> {
    let [rows, cols] = t.dims();
    let values: Vec<f64> = t.into_data().iter::<f64>().collect();
    Array2::from_shape_fn((rows, cols), |(i, j)| values[i * cols + j])
}

/// First element of a tensor as `f64`
pub fn tensor_scalar<B: Backend>(t: Tensor<B, 1>) -> f64 {
    t.slice([0..1]).into_scalar().elem::<f64>()
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
