//! Octane rating
//!
//! Maps measured performance onto a research octane number (RON) between
//! 70 and 100, and a RON onto a named grade.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest RON any component can score
pub const MIN_RON: f64 = 70.0;
/// Highest RON any component can score
pub const MAX_RON: f64 = 100.0;

/// A named band of the octane scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OctaneGrade {
    /// Lowest RON in this band
    pub min_ron: f64,
    /// Grade name
    pub grade: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Display colour label
    pub color: &'static str,
}

/// All grades, best first
pub const OCTANE_GRADES: [OctaneGrade; 5] = [
    OctaneGrade {
        min_ron: 95.0,
        grade: "racing_fuel",
        description: "Ultimate performance for extreme workloads",
        color: "RED",
    },
    OctaneGrade {
        min_ron: 90.0,
        grade: "premium_plus",
        description: "High performance for demanding applications",
        color: "ORANGE",
    },
    OctaneGrade {
        min_ron: 85.0,
        grade: "premium",
        description: "Good performance for most applications",
        color: "YELLOW",
    },
    OctaneGrade {
        min_ron: 80.0,
        grade: "regular_plus",
        description: "Standard performance for regular use",
        color: "GREEN",
    },
    OctaneGrade {
        min_ron: MIN_RON,
        grade: "regular",
        description: "Basic performance for light workloads",
        color: "BLUE",
    },
];

/// Find the grade band for a RON
pub fn grade_for(ron: f64) -> &'static OctaneGrade {
    OCTANE_GRADES
        .iter()
        .find(|g| ron >= g.min_ron)
        .unwrap_or(&OCTANE_GRADES[OCTANE_GRADES.len() - 1])
}

/// Reference performance for a hardware class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Single-core compute score; the multi-core reference is eight times this
    pub cpu: f64,
    /// Storage throughput in MB/s
    pub storage: f64,
    /// Download speed in Mbit/s
    pub network: f64,
}

/// Known baseline categories
pub const BASELINE_CATEGORIES: [&str; 5] =
    ["default", "entry_level", "mid_range", "high_end", "enthusiast"];

/// Look up a baseline category, falling back to `default`
pub fn baseline(category: &str) -> Baseline {
    match category {
        "entry_level" => Baseline {
            cpu: 500.0,
            storage: 150.0,
            network: 50.0,
        },
        "mid_range" => Baseline {
            cpu: 1500.0,
            storage: 1000.0,
            network: 200.0,
        },
        "high_end" => Baseline {
            cpu: 2500.0,
            storage: 2000.0,
            network: 500.0,
        },
        "enthusiast" => Baseline {
            cpu: 4000.0,
            storage: 5000.0,
            network: 1000.0,
        },
        _ => Baseline {
            cpu: 1000.0,
            storage: 500.0,
            network: 100.0,
        },
    }
}

/// Score a measurement against its baseline on a logarithmic scale.
///
/// Matching the baseline scores 70; every tenfold improvement adds 30,
/// clamped to [70, 100].
pub fn component_ron(measured: f64, baseline: f64) -> f64 {
    if !(measured > 0.0 && baseline > 0.0) {
        return MIN_RON;
    }
    (MIN_RON + 30.0 * (measured / baseline).log10()).clamp(MIN_RON, MAX_RON)
}

/// Cores the multi-core CPU reference assumes
pub const CPU_REFERENCE_CORES: f64 = 8.0;

/// Weight of the single-core score in the CPU rating
const SINGLE_CORE_WEIGHT: f64 = 0.4;

/// Combine single- and multi-core compute scores into one CPU RON.
///
/// Each score is placed on the log scale unclamped, against `baseline` and
/// `baseline * 8` respectively, then weighted 40/60 and clamped.
pub fn cpu_ron(single_core: f64, multi_core: f64, baseline: f64) -> f64 {
    if !(single_core > 0.0 && multi_core > 0.0 && baseline > 0.0) {
        return MIN_RON;
    }
    let single = MIN_RON + 30.0 * (single_core / baseline).log10();
    let multi = MIN_RON + 30.0 * (multi_core / (baseline * CPU_REFERENCE_CORES)).log10();
    (single * SINGLE_CORE_WEIGHT + multi * (1.0 - SINGLE_CORE_WEIGHT)).clamp(MIN_RON, MAX_RON)
}

/// A scored component, ready to serialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRating {
    /// Research octane number
    pub ron: f64,
    /// Grade name
    pub grade: String,
    /// Human-readable description
    pub description: String,
    /// Display colour label
    pub color: String,
}

impl ComponentRating {
    /// Rate a measurement against a baseline value
    pub fn rate(measured: f64, baseline: f64) -> Self {
        Self::from_ron(component_ron(measured, baseline))
    }

    /// Wrap a RON with its grade band
    pub fn from_ron(ron: f64) -> Self {
        let grade = grade_for(ron);
        Self {
            ron,
            grade: grade.grade.to_string(),
            description: grade.description.to_string(),
            color: grade.color.to_string(),
        }
    }

    /// Styled grade label for terminal output
    pub fn styled_grade(&self) -> console::StyledObject<&str> {
        let styled = console::style(self.grade.as_str()).bold();
        match self.color.as_str() {
            "RED" => styled.red(),
            "ORANGE" | "YELLOW" => styled.yellow(),
            "GREEN" => styled.green(),
            _ => styled.blue(),
        }
    }
}

impl fmt::Display for ComponentRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RON {:.1} ({}) - {}", self.ron, self.grade, self.description)
    }
}
