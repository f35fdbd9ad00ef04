/// CPU capabilities relevant to kernel selection.
///
/// Detected once by the embedder at startup and handed to every operation it creates; never
/// mutated afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuCaps {
    /// x86 SSE2.
    pub sse2: bool,
    /// x86 AVX2.
    pub avx2: bool,
    /// ARM NEON.
    pub neon: bool,
}

impl CpuCaps {
    /// Detect what the running CPU supports.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                sse2: std::arch::is_x86_feature_detected!("sse2"),
                avx2: std::arch::is_x86_feature_detected!("avx2"),
                neon: false,
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            Self {
                sse2: false,
                avx2: false,
                neon: std::arch::is_aarch64_feature_detected!("neon"),
            }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::scalar()
        }
    }

    /// No acceleration; every kernel uses the scalar laws.
    pub const fn scalar() -> Self {
        Self {
            sse2: false,
            avx2: false,
            neon: false,
        }
    }

    /// `true` when four-wide float lanes are available.
    pub const fn has_wide_lanes(self) -> bool {
        self.sse2 || self.avx2 || self.neon
    }
}
