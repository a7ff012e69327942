// Test utilities for backend-aware tensor construction
//
// Observation grids, parameter tensors and read-back helpers shared by the
// unit tests, the integration tests and the benches. Everything is generic
// over the backend so the same fixtures run on NdArray and Autodiff<NdArray>.

use burn::tensor::{backend::Backend, Tensor, TensorData};

/// Create an f32 tensor of the given shape from a flat slice.
pub fn tensor_from_f32_vec<B: Backend, const D: usize>(
    data: &[f32],
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    let expected_size: usize = shape.iter().product();
    assert_eq!(
        data.len(),
        expected_size,
        "Data length {} doesn't match shape {:?} (expected {})",
        data.len(),
        shape,
        expected_size
    );

    Tensor::from_data(TensorData::new(data.to_vec(), shape), device)
}

/// A parameter tensor of rank `D` with every extent 1, broadcastable against
/// any observation tensor of the same rank.
pub fn scalar_param<B: Backend, const D: usize>(value: f32, device: &B::Device) -> Tensor<B, D> {
    tensor_from_f32_vec(&[value], [1; D], device)
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn grid(start: f32, end: f32, n: usize) -> Vec<f32> {
    assert!(n >= 2, "grid needs at least two points, got {}", n);
    let step = (end - start) / (n - 1) as f32;
    (0..n).map(|i| start + step * i as f32).collect()
}

/// Read a tensor back to the host as a flat f32 vector.
pub fn to_f32_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .expect("float tensor data converts to f32")
}
