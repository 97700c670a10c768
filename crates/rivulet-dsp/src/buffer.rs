//! Complex buffer type shared by the kernel and the engine.

/// A complex-valued buffer stored as separate real and imaginary lanes.
///
/// Both lanes always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexBuffer {
    /// In-phase component.
    pub re: Vec<f32>,
    /// Quadrature component.
    pub im: Vec<f32>,
}

impl ComplexBuffer {
    /// Creates a buffer of `len` zeros.
    pub fn zeros(len: usize) -> Self {
        Self {
            re: vec![0.0; len],
            im: vec![0.0; len],
        }
    }

    /// Builds a buffer from two lanes, truncating the longer one.
    pub fn from_parts(mut re: Vec<f32>, mut im: Vec<f32>) -> Self {
        let len = re.len().min(im.len());
        re.truncate(len);
        im.truncate(len);
        Self { re, im }
    }

    /// Number of complex samples.
    pub fn len(&self) -> usize {
        self.re.len()
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    /// Magnitude `sqrt(re² + im²)` of every sample.
    pub fn magnitudes(&self) -> Vec<f32> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(r, i)| (r * r + i * i).sqrt())
            .collect()
    }
}
