use cellpack_pack::{GridExtents, PackError};

/// Default text of each dimension field.
pub const DEFAULT_DIMENSION: &str = "1";

/// The three text fields for pack dimensions, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInputs {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl Default for DimensionInputs {
    fn default() -> Self {
        Self {
            x: DEFAULT_DIMENSION.into(),
            y: DEFAULT_DIMENSION.into(),
            z: DEFAULT_DIMENSION.into(),
        }
    }
}

impl DimensionInputs {
    /// Parse `"X,Y,Z"` (as given on the command line) into field text.
    /// Trailing parts that are absent keep the default. Parts that are
    /// present, even empty ones, are kept verbatim for validation.
    pub fn from_csv(text: &str) -> Self {
        let mut parts = text.split(',').map(str::trim);
        let mut next = || parts.next().unwrap_or(DEFAULT_DIMENSION).to_string();
        let x = next();
        let y = next();
        let z = next();
        Self { x, y, z }
    }

    pub fn fields(&self) -> [&str; 3] {
        [&self.x, &self.y, &self.z]
    }

    /// Validate the current text as grid extents.
    pub fn extents(&self) -> Result<GridExtents, PackError> {
        GridExtents::parse(&self.x, &self.y, &self.z)
    }

    pub fn reset(&mut self) {
        tracing::debug!("dimension fields reset");
        *self = Self::default();
    }
}
