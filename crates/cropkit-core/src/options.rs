//! Tunable crop settings.

use serde::{Deserialize, Serialize};

use crate::crop::CropError;
use crate::transform::InterpolationFilter;

/// Settings shared by both crop strategies.
///
/// Missing fields deserialize to their defaults, so hosts only need to send
/// what they override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropOptions {
    /// Multiplier applied to the output size before picking the region
    /// decode sample size. Keeps a resolution margin above the target since
    /// sample sizes are quantized to powers of two. Tuning knob, default 2.
    pub oversample_factor: u32,
    /// Filter used when re-rendering through a scale/rotation transform.
    pub filter: InterpolationFilter,
    /// Largest pixel buffer (width * height) the croppers will allocate.
    pub max_decoded_pixels: u64,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            oversample_factor: 2,
            filter: InterpolationFilter::Bilinear,
            max_decoded_pixels: 64 * 1024 * 1024,
        }
    }
}

impl CropOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), CropError> {
        if self.oversample_factor == 0 {
            return Err(CropError::InvalidOptions(
                "oversample factor must be at least 1",
            ));
        }
        if self.max_decoded_pixels == 0 {
            return Err(CropError::InvalidOptions(
                "max decoded pixels must be at least 1",
            ));
        }
        Ok(())
    }
}
