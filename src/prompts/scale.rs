/// Visual scale and pattern frequency of a repeating unit, bucketed by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleBand {
    Micro,
    MicroSmall,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl ScaleBand {
    /// Bands are half-open: `[3, 15)`, `[15, 30)`, `[30, 50)`, `[50, 100)`.
    pub fn for_size_cm(size: f64) -> Self {
        match size {
            s if s < 3.0 => ScaleBand::Micro,
            s if s < 15.0 => ScaleBand::MicroSmall,
            s if s < 30.0 => ScaleBand::Small,
            s if s < 50.0 => ScaleBand::Medium,
            s if s < 100.0 => ScaleBand::Large,
            _ => ScaleBand::ExtraLarge,
        }
    }

    pub fn descriptor(&self) -> &'static str {
        match self {
            ScaleBand::Micro => "micro-scale, very-high-frequency",
            ScaleBand::MicroSmall => "micro/small-scale, very-high/high-frequency",
            ScaleBand::Small => "small-scale, high-frequency",
            ScaleBand::Medium => "medium-scale, moderate-frequency",
            ScaleBand::Large => "large-scale, low-frequency",
            ScaleBand::ExtraLarge => "extra-large-scale, very-low-frequency",
        }
    }
}

/// Shortest exact decimal form; whole numbers print without a trailing `.0`.
pub fn format_cm(value: f64) -> String {
    format!("{}", value)
}
