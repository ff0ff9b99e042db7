//! CPU capability detection for picking the compression path.
//!
//! Detection runs once per process. The result only ever selects between
//! implementations that produce identical output.

use once_cell::sync::Lazy;

static DETECTED: Lazy<Capabilities> = Lazy::new(Capabilities::probe);

/// Capabilities is the set of vector/hash extensions available to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// x86 SSE4.1.
    pub sse41: bool,
    /// x86 AVX2.
    pub avx2: bool,
    /// x86 SHA extensions.
    pub sha_ni: bool,
    /// aarch64 NEON.
    pub neon: bool,
}

impl Capabilities {
    /// detect returns the cached capabilities of the running CPU.
    pub fn detect() -> Self {
        *DETECTED
    }

    /// scalar is the empty capability set; it forces the scalar transform.
    pub fn scalar() -> Self {
        Self::default()
    }

    /// has_wide_vectors reports whether the lane-batched transform is worth using.
    pub fn has_wide_vectors(&self) -> bool {
        self.sse41 || self.avx2 || self.neon
    }

    #[cfg(target_arch = "x86_64")]
    fn probe() -> Self {
        Self {
            sse41: std::arch::is_x86_feature_detected!("sse4.1"),
            avx2: std::arch::is_x86_feature_detected!("avx2"),
            sha_ni: std::arch::is_x86_feature_detected!("sha"),
            neon: false,
        }
    }

    #[cfg(target_arch = "aarch64")]
    fn probe() -> Self {
        Self {
            neon: std::arch::is_aarch64_feature_detected!("neon"),
            ..Self::default()
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    fn probe() -> Self {
        Self::default()
    }
}
