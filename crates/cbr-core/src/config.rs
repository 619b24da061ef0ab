use crate::error::ConfigError;

/// Env var overriding [`CbrConfig::viewport_shift_x`].
pub const VIEWPORT_SHIFT_ENV: &str = "CBR_VIEWPORT_SHIFT_X";

/// Clear values and sub-pixel offset applied by the redirector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CbrConfig {
    /// Added to the viewport's top-left x on odd frames, in device units.
    pub viewport_shift_x: f32,
    /// Clear color for G-buffer slots 0..4. The negative alpha marks "no sample this frame".
    pub miss_color: [f32; 4],
    /// Clear color for the coverage mask slot.
    pub mask_color: [f32; 4],
    pub depth_clear: f32,
    pub stencil_clear: u8,
}

impl Default for CbrConfig {
    fn default() -> Self {
        Self {
            viewport_shift_x: 0.5,
            miss_color: [0.0, 0.0, 0.0, -1.0],
            mask_color: [1.0, 1.0, 1.0, 1.0],
            depth_clear: 0.0,
            stencil_clear: 0,
        }
    }
}

impl CbrConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`CbrConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(VIEWPORT_SHIFT_ENV) {
            let raw = raw.trim();
            if !raw.is_empty() {
                config.viewport_shift_x = raw
                    .parse::<f32>()
                    .ok()
                    .filter(|shift| shift.is_finite())
                    .ok_or_else(|| ConfigError::InvalidEnv {
                        var: VIEWPORT_SHIFT_ENV,
                        value: raw.to_owned(),
                    })?;
            }
        }
        Ok(config)
    }
}
