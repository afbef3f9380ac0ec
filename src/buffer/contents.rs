use rand::{RngCore, SeedableRng, rngs::StdRng};

pub const DEFAULT_RANDOM_SEED: u64 = 0x5EED;

/// Byte pattern written into a buffer before it is benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferContents {
    #[default]
    Zeros,
    IncreasingBytes,
    Random(u64),
}

impl BufferContents {
    /// Parses a pattern name; anything unrecognized falls back to zeros.
    pub fn parse_lossy(name: &str, seed: u64) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "zeros" | "zero" => Self::Zeros,
            "increasing" | "increasingbytes" | "increasing-bytes" => Self::IncreasingBytes,
            "random" => Self::Random(seed),
            other => {
                log::warn!("unknown buffer contents {other:?}, using zeros");
                Self::Zeros
            }
        }
    }

    pub fn write(self, bytes: &mut [u8]) {
        match self {
            Self::Zeros => bytes.fill(0),
            Self::IncreasingBytes => {
                for (i, b) in bytes.iter_mut().enumerate() {
                    *b = i as u8;
                }
            }
            Self::Random(seed) => StdRng::seed_from_u64(seed).fill_bytes(bytes),
        }
    }
}
