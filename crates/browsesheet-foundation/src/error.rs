/// Configuration errors. Runtime operations on a valid sheet never fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetError {
    NonFiniteAnchor { name: &'static str, value: f32 },
    UnorderedAnchors {
        min: f32,
        full_width: f32,
        collapsed: f32,
        max: f32,
    },
    FractionOutOfRange { name: &'static str, value: f32 },
    UnorderedFractions { full_width: f32, collapsed: f32 },
    InvalidDensity { density: f32 },
    InvalidParameter { name: &'static str, value: f32 },
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetError::NonFiniteAnchor { name, value } => {
                write!(f, "anchor {name} is not finite ({value})")
            }
            SheetError::UnorderedAnchors {
                min,
                full_width,
                collapsed,
                max,
            } => write!(
                f,
                "anchors out of order: min {min}, full width {full_width}, collapsed {collapsed}, max {max}"
            ),
            SheetError::FractionOutOfRange { name, value } => {
                write!(f, "{name} must lie in [0, 1], got {value}")
            }
            SheetError::UnorderedFractions {
                full_width,
                collapsed,
            } => write!(
                f,
                "full width fraction {full_width} exceeds collapsed fraction {collapsed}"
            ),
            SheetError::InvalidDensity { density } => {
                write!(f, "density must be positive and finite, got {density}")
            }
            SheetError::InvalidParameter { name, value } => {
                write!(f, "invalid {name}: {value}")
            }
        }
    }
}

impl std::error::Error for SheetError {}
