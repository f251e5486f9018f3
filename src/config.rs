//! Render surface configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings used to create the render surface and drive the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VizConfig {
    /// Window title
    pub name: String,
    /// Keep the aspect ratio of the initial window size when resizing
    pub fix_aspect: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Loop iterations between checks of the external interrupt flag
    pub check_every: usize,
}

impl VizConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_fix_aspect(mut self, fix_aspect: bool) -> Self {
        self.fix_aspect = fix_aspect;
        self
    }

    pub fn with_check_every(mut self, check_every: usize) -> Self {
        self.check_every = check_every;
        self
    }
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            name: "Point Viz".to_string(),
            fix_aspect: false,
            window_width: 800,
            window_height: 600,
            check_every: 10,
        }
    }
}
