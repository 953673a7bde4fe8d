//! Normalized 2D Gaussian kernels.

/// A square, normalized Gaussian convolution kernel of odd size.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    size: usize,
    sigma: f32,
    weights: Vec<f32>, // row-major, size * size
}

impl GaussianKernel {
    /// Builds a `size x size` kernel with weights `exp(-(x^2 + y^2) / (2 sigma^2))`
    /// around the center, normalized to sum to one.
    ///
    /// # Panics
    /// Panics if `size` is even: such a kernel has no center texel, so asking
    /// for one is a programming error.
    pub fn new(size: usize, sigma: f32) -> Self {
        assert!(
            size % 2 == 1,
            "kernel size {size} is an even number, invalid size"
        );
        let twiced_sigma_squared = 2.0 * sigma * sigma;
        let offset = (size / 2) as i32;

        let mut weights = Vec::with_capacity(size * size);
        let mut sum = 0.0f32;
        for y in -offset..=offset {
            for x in -offset..=offset {
                let r_squared = (x * x + y * y) as f32;
                let weight = (-r_squared / twiced_sigma_squared).exp();
                weights.push(weight);
                sum += weight;
            }
        }
        for w in &mut weights {
            *w /= sum;
        }

        Self {
            size,
            sigma,
            weights,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Half-width: offsets run over `-radius..=radius`.
    pub fn radius(&self) -> i32 {
        (self.size / 2) as i32
    }

    /// Weight at offset `(dx, dy)` from the center.
    #[inline]
    pub fn weight(&self, dx: i32, dy: i32) -> f32 {
        let r = self.radius();
        debug_assert!(dx.abs() <= r && dy.abs() <= r);
        self.weights[((dy + r) as usize) * self.size + (dx + r) as usize]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Graduated kernels for texels outside the light boundary.
///
/// Entry `i` has radius `overlap + i` and sigma equal to its radius, for
/// radii `overlap..=max_dist`. A texel `d` texels away from the boundary is
/// filtered with entry `d - 1`, so its kernel always reaches `overlap` texels
/// past the boundary.
#[derive(Debug, Clone)]
pub struct KernelBank {
    overlap: u32,
    max_dist: u32,
    kernels: Vec<GaussianKernel>,
}

impl KernelBank {
    pub fn new(overlap: u32, max_dist: u32) -> Self {
        assert!(
            overlap <= max_dist,
            "kernel bank overlap {overlap} exceeds max distance {max_dist}"
        );
        let kernels = (overlap..=max_dist)
            .map(|radius| GaussianKernel::new(2 * radius as usize + 1, radius as f32))
            .collect();
        Self {
            overlap,
            max_dist,
            kernels,
        }
    }

    /// Largest exterior distance (in texels) still filtered; farther texels
    /// are passed through untouched.
    pub fn reach(&self) -> u32 {
        self.max_dist - self.overlap
    }

    /// Kernel for a texel `distance` texels outside the boundary.
    ///
    /// # Panics
    /// Panics unless `1 <= distance <= self.reach()`.
    pub fn for_distance(&self, distance: u32) -> &GaussianKernel {
        assert!(
            distance >= 1 && distance <= self.reach(),
            "exterior distance {distance} outside kernel bank range 1..={}",
            self.reach()
        );
        &self.kernels[(distance - 1) as usize]
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}
