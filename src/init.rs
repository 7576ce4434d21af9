use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// Uniform in `[-1/sqrt(fan_in), 1/sqrt(fan_in)]`, the classic
    /// DDPG hidden-layer initialization
    FanInUniform,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a weight matrix of the given `(fan_in, fan_out)` shape.
    pub fn initialize_weights(&self, shape: (usize, usize)) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random(shape, Uniform::new(-limit, limit))
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f32).sqrt();
                Array2::random(shape, Uniform::new(-limit, limit))
            }

            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in as f32).sqrt();
                Array2::random(shape, Uniform::new(-limit, limit))
            }

            WeightInit::Uniform { min, max } => Array2::random(shape, Uniform::new(*min, *max)),

            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize a bias vector of the given size.
    pub fn initialize_biases(&self, size: usize) -> Array1<f32> {
        match self {
            WeightInit::Zeros | WeightInit::XavierUniform | WeightInit::HeUniform => {
                Array1::zeros(size)
            }

            WeightInit::FanInUniform => {
                // fan_in of a bias is the layer width
                let limit = 1.0 / (size as f32).sqrt();
                Array1::random(size, Uniform::new(-limit, limit))
            }

            WeightInit::Uniform { min, max } => Array1::random(size, Uniform::new(*min, *max)),
        }
    }
}
