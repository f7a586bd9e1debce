//! SIMD primitive operations behind the distance functions.
//!
//! Two tiers, selected at compile time:
//! 1. Native ARM NEON intrinsics on aarch64
//! 2. Portable `wide` crate elsewhere (AVX2/SSE on x86_64)
//!
//! Kernels are exact; embedding scans are the hot path of concept
//! resolution, where every query touches the whole index.

#[cfg(target_arch = "aarch64")]
mod neon {
    use std::arch::aarch64::*;

    /// Dot product using NEON fused multiply-accumulate.
    #[inline]
    #[target_feature(enable = "neon")]
    pub unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
        unsafe {
            let n = a.len();
            let chunks = n / 4;

            let a_ptr = a.as_ptr();
            let b_ptr = b.as_ptr();
            let mut sum = vdupq_n_f32(0.0);

            for i in 0..chunks {
                let offset = i * 4;
                let va = vld1q_f32(a_ptr.add(offset));
                let vb = vld1q_f32(b_ptr.add(offset));
                sum = vfmaq_f32(sum, va, vb);
            }

            let mut result = vaddvq_f32(sum);
            for i in (chunks * 4)..n {
                result += a[i] * b[i];
            }
            result
        }
    }

    /// Squared L2 norm using NEON.
    #[inline]
    #[target_feature(enable = "neon")]
    pub unsafe fn squared_norm_neon(a: &[f32]) -> f32 {
        unsafe {
            let n = a.len();
            let chunks = n / 4;
            let a_ptr = a.as_ptr();
            let mut sum = vdupq_n_f32(0.0);

            for i in 0..chunks {
                let offset = i * 4;
                let va = vld1q_f32(a_ptr.add(offset));
                sum = vfmaq_f32(sum, va, va);
            }

            let mut result = vaddvq_f32(sum);
            for i in (chunks * 4)..n {
                result += a[i] * a[i];
            }
            result
        }
    }

    /// Squared Euclidean distance using NEON.
    #[inline]
    #[target_feature(enable = "neon")]
    pub unsafe fn squared_euclidean_neon(a: &[f32], b: &[f32]) -> f32 {
        unsafe {
            let n = a.len();
            let chunks = n / 4;

            let a_ptr = a.as_ptr();
            let b_ptr = b.as_ptr();
            let mut sum = vdupq_n_f32(0.0);

            for i in 0..chunks {
                let offset = i * 4;
                let va = vld1q_f32(a_ptr.add(offset));
                let vb = vld1q_f32(b_ptr.add(offset));
                let diff = vsubq_f32(va, vb);
                sum = vfmaq_f32(sum, diff, diff);
            }

            let mut result = vaddvq_f32(sum);
            for i in (chunks * 4)..n {
                let diff = a[i] - b[i];
                result += diff * diff;
            }
            result
        }
    }
}

#[cfg(not(target_arch = "aarch64"))]
mod portable {
    use wide::f32x8;

    const WIDTH: usize = 8;

    #[inline]
    pub fn dot_product_wide(a: &[f32], b: &[f32]) -> f32 {
        let n = a.len();
        let chunks = n / WIDTH;

        let mut sum = f32x8::ZERO;
        for i in 0..chunks {
            let offset = i * WIDTH;
            let va = f32x8::from(&a[offset..offset + WIDTH]);
            let vb = f32x8::from(&b[offset..offset + WIDTH]);
            sum += va * vb;
        }

        let mut result = sum.reduce_add();
        for i in (chunks * WIDTH)..n {
            result += a[i] * b[i];
        }
        result
    }

    #[inline]
    pub fn squared_norm_wide(a: &[f32]) -> f32 {
        let n = a.len();
        let chunks = n / WIDTH;

        let mut sum = f32x8::ZERO;
        for i in 0..chunks {
            let offset = i * WIDTH;
            let va = f32x8::from(&a[offset..offset + WIDTH]);
            sum += va * va;
        }

        let mut result = sum.reduce_add();
        for i in (chunks * WIDTH)..n {
            result += a[i] * a[i];
        }
        result
    }

    #[inline]
    pub fn squared_euclidean_wide(a: &[f32], b: &[f32]) -> f32 {
        let n = a.len();
        let chunks = n / WIDTH;

        let mut sum = f32x8::ZERO;
        for i in 0..chunks {
            let offset = i * WIDTH;
            let va = f32x8::from(&a[offset..offset + WIDTH]);
            let vb = f32x8::from(&b[offset..offset + WIDTH]);
            let diff = va - vb;
            sum += diff * diff;
        }

        let mut result = sum.reduce_add();
        for i in (chunks * WIDTH)..n {
            let diff = a[i] - b[i];
            result += diff * diff;
        }
        result
    }
}

/// Compute dot product of two f32 slices using SIMD.
///
/// # Panics
/// Panics if slices have different lengths.
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: lengths checked above; NEON is always available on aarch64
        unsafe { neon::dot_product_neon(a, b) }
    }

    #[cfg(not(target_arch = "aarch64"))]
    {
        portable::dot_product_wide(a, b)
    }
}

/// Compute squared L2 norm using SIMD.
#[inline]
pub fn squared_norm_simd(a: &[f32]) -> f32 {
    #[cfg(target_arch = "aarch64")]
    {
        unsafe { neon::squared_norm_neon(a) }
    }

    #[cfg(not(target_arch = "aarch64"))]
    {
        portable::squared_norm_wide(a)
    }
}

/// Compute squared Euclidean distance between two vectors using SIMD.
///
/// # Panics
/// Panics if slices have different lengths.
#[inline]
pub fn squared_euclidean_simd(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");

    #[cfg(target_arch = "aarch64")]
    {
        unsafe { neon::squared_euclidean_neon(a, b) }
    }

    #[cfg(not(target_arch = "aarch64"))]
    {
        portable::squared_euclidean_wide(a, b)
    }
}

/// Normalize a vector in-place. Returns the original norm.
///
/// Vectors with norm below 1e-10 are left untouched.
#[inline]
pub fn normalize_simd(vec: &mut [f32]) -> f32 {
    let norm = squared_norm_simd(vec).sqrt();
    if norm > 1e-10 {
        let inv = 1.0 / norm;
        for x in vec.iter_mut() {
            *x *= inv;
        }
    }
    norm
}
