/// Display-bucket classification for ticker cells
///
/// Two independent, stateless classifications: price-change magnitude and
/// 24h volume tier. Both are total over all finite inputs, so the render
/// layer never has to special-case a record.
use crate::types::CoinRecord;

/// Highlight tier for the absolute percentage change of a cell
///
/// Ordered from no highlight to strongest; lower bucket edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeBucket {
    None,
    Mild,
    Elevated,
    High,
    Extreme,
}

impl ChangeBucket {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeBucket::None => "none",
            ChangeBucket::Mild => "mild",
            ChangeBucket::Elevated => "elevated",
            ChangeBucket::High => "high",
            ChangeBucket::Extreme => "extreme",
        }
    }
}

/// 24h volume tier of a cell
///
/// Upper bucket edges are inclusive; a missing volume is not classifiable
/// and lands in the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VolumeBucket {
    Low,
    Medium,
    Large,
    Max,
}

impl VolumeBucket {
    pub fn label(&self) -> &'static str {
        match self {
            VolumeBucket::Low => "low",
            VolumeBucket::Medium => "medium",
            VolumeBucket::Large => "large",
            VolumeBucket::Max => "max",
        }
    }
}

/// Classify a signed percentage change by magnitude
///
/// Thresholds are evaluated highest to lowest, first match wins:
/// >= 3 extreme, >= 2 high, >= 1.5 elevated, >= 0.5 mild, otherwise none.
pub fn change_bucket(change: f64) -> ChangeBucket {
    let magnitude = change.abs();
    if magnitude >= 3.0 {
        ChangeBucket::Extreme
    } else if magnitude >= 2.0 {
        ChangeBucket::High
    } else if magnitude >= 1.5 {
        ChangeBucket::Elevated
    } else if magnitude >= 0.5 {
        ChangeBucket::Mild
    } else {
        ChangeBucket::None
    }
}

/// Classify a 24h volume into its tier
///
/// Thresholds are evaluated lowest to highest, inclusive:
/// <= 10M low, <= 50M medium, <= 100M large, otherwise max.
pub fn volume_bucket(volume_24h: Option<f64>) -> VolumeBucket {
    match volume_24h {
        None => VolumeBucket::Low,
        Some(v) if v <= 10_000_000.0 => VolumeBucket::Low,
        Some(v) if v <= 50_000_000.0 => VolumeBucket::Medium,
        Some(v) if v <= 100_000_000.0 => VolumeBucket::Large,
        Some(_) => VolumeBucket::Max,
    }
}

/// Both buckets of a record at once
pub fn classify(record: &CoinRecord) -> (ChangeBucket, VolumeBucket) {
    (change_bucket(record.change), volume_bucket(record.volume_24h))
}
