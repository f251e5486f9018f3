//! Built-in color ramps for mapping point keys to RGB

use crate::array::ArrayView;

/// A read-only N x 3 color table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    name: &'static str,
    colors: &'static [[f32; 3]],
}

impl Palette {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn colors(&self) -> &'static [[f32; 3]] {
        self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Row-major N x 3 view, suitable for `Cloud::set_palette`.
    pub fn as_view(&self) -> ArrayView<'static, f32> {
        ArrayView::new(self.colors.as_flattened(), &[self.colors.len(), 3])
            .unwrap_or_else(|_| ArrayView::from_slice(self.colors.as_flattened()))
    }
}

/// Look up one of the built-in palettes by name.
pub fn by_name(name: &str) -> Option<Palette> {
    match name {
        "spezia" => Some(spezia()),
        "calref" => Some(calref()),
        _ => None,
    }
}

/// Default palette for range and signal keys.
pub fn spezia() -> Palette {
    Palette {
        name: "spezia",
        colors: &SPEZIA,
    }
}

/// Palette for calibrated reflectivity keys.
pub fn calref() -> Palette {
    Palette {
        name: "calref",
        colors: &CALREF,
    }
}

/// Sample a flat RGB table (3 floats per entry) at `key`, clamped to [0, 1].
pub(crate) fn sample(colors: &[f32], key: f32) -> [f32; 3] {
    let count = colors.len() / 3;
    if count == 0 {
        return [0.0; 3];
    }
    let key = if key.is_nan() { 0.0 } else { key.clamp(0.0, 1.0) };
    let index = (key * (count - 1) as f32).round() as usize;
    let rgb = &colors[index * 3..index * 3 + 3];
    [rgb[0], rgb[1], rgb[2]]
}

static SPEZIA: [[f32; 3]; 16] = [
    [0.040, 0.120, 0.360],
    [0.060, 0.200, 0.520],
    [0.070, 0.300, 0.650],
    [0.060, 0.420, 0.740],
    [0.040, 0.540, 0.780],
    [0.030, 0.650, 0.760],
    [0.080, 0.740, 0.690],
    [0.220, 0.800, 0.560],
    [0.400, 0.840, 0.400],
    [0.580, 0.860, 0.250],
    [0.750, 0.850, 0.140],
    [0.890, 0.800, 0.100],
    [0.970, 0.700, 0.120],
    [0.990, 0.570, 0.150],
    [0.970, 0.420, 0.170],
    [0.930, 0.270, 0.180],
];

static CALREF: [[f32; 3]; 16] = [
    [0.100, 0.100, 0.100],
    [0.250, 0.060, 0.400],
    [0.330, 0.080, 0.600],
    [0.300, 0.170, 0.800],
    [0.180, 0.320, 0.930],
    [0.080, 0.480, 0.960],
    [0.050, 0.640, 0.900],
    [0.080, 0.770, 0.760],
    [0.200, 0.860, 0.560],
    [0.420, 0.920, 0.340],
    [0.650, 0.940, 0.200],
    [0.850, 0.900, 0.150],
    [0.980, 0.780, 0.150],
    [1.000, 0.600, 0.180],
    [1.000, 0.420, 0.300],
    [1.000, 0.850, 0.850],
];
