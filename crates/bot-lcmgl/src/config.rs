/// Decoder limits.
///
/// IDs and lengths come from the network, so every table and payload is bounded before anything
/// is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecoderConfig {
    pub max_matrix_depth: u32,
    pub max_attrib_depth: u32,
    /// Largest texture or display-list ID a stream may use.
    pub max_resource_id: u32,
    pub max_text_len: usize,
    /// Largest vertex count in a single VERTICES3F record.
    pub max_array_len: usize,
    /// Largest pixel payload of a single TEX_IMAGE_2D record.
    pub max_texture_bytes: usize,
}

pub const DEFAULT_MAX_MATRIX_DEPTH: u32 = 32;
pub const DEFAULT_MAX_ATTRIB_DEPTH: u32 = 16;
pub const DEFAULT_MAX_RESOURCE_ID: u32 = 4095;
pub const DEFAULT_MAX_TEXT_LEN: usize = 64 * 1024;
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 20;
pub const DEFAULT_MAX_TEXTURE_BYTES: usize = 64 * 1024 * 1024;

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_matrix_depth: DEFAULT_MAX_MATRIX_DEPTH,
            max_attrib_depth: DEFAULT_MAX_ATTRIB_DEPTH,
            max_resource_id: DEFAULT_MAX_RESOURCE_ID,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_texture_bytes: DEFAULT_MAX_TEXTURE_BYTES,
        }
    }
}

impl DecoderConfig {
    /// Reads overrides from `LCMGL_MAX_*` environment variables; unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_matrix_depth: parse_var(&lookup, "LCMGL_MAX_MATRIX_DEPTH")?
                .unwrap_or(defaults.max_matrix_depth),
            max_attrib_depth: parse_var(&lookup, "LCMGL_MAX_ATTRIB_DEPTH")?
                .unwrap_or(defaults.max_attrib_depth),
            max_resource_id: parse_var(&lookup, "LCMGL_MAX_RESOURCE_ID")?
                .unwrap_or(defaults.max_resource_id),
            max_text_len: parse_var(&lookup, "LCMGL_MAX_TEXT_LEN")?
                .unwrap_or(defaults.max_text_len),
            max_array_len: parse_var(&lookup, "LCMGL_MAX_ARRAY_LEN")?
                .unwrap_or(defaults.max_array_len),
            max_texture_bytes: parse_var(&lookup, "LCMGL_MAX_TEXTURE_BYTES")?
                .unwrap_or(defaults.max_texture_bytes),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv(name)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for env var {0}")]
    InvalidEnv(&'static str),
}
