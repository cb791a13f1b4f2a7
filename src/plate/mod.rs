pub mod curve;
pub mod well_id;

pub use curve::{CurvePoint, endpoint_rfu, parse_curve};
pub use well_id::{PLATE_COLS, PLATE_ROWS, PLATE_WELLS, WellId};

pub const PATIENT_RATIO_CEILING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    None,
    EmptyWell,
    InsufficientDna,
    LowRfu,
}

impl Warning {
    pub fn as_str(self) -> &'static str {
        match self {
            Warning::None => "none",
            Warning::EmptyWell => "empty_well",
            Warning::InsufficientDna => "insufficient_dna",
            Warning::LowRfu => "low_rfu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegressionClass {
    SafeZone,
    RiskyArea,
    NotApplicable,
}

impl RegressionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RegressionClass::SafeZone => "safe_zone",
            RegressionClass::RiskyArea => "risky_area",
            RegressionClass::NotApplicable => "not_applicable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genotype {
    Healthy,
    Uncertain,
    Carrier,
    Patient,
    Repeat,
}

impl Genotype {
    pub fn as_str(self) -> &'static str {
        match self {
            Genotype::Healthy => "healthy",
            Genotype::Uncertain => "uncertain",
            Genotype::Carrier => "carrier",
            Genotype::Patient => "patient",
            Genotype::Repeat => "repeat",
        }
    }
}

// shared by both calibration paths; upper bounds are inclusive, so a
// ratio exactly at `uncertain` is Uncertain and exactly 0.1 is Patient
pub fn classify_ratio(ratio: f64, carrier: f64, uncertain: f64) -> Genotype {
    if ratio > uncertain {
        Genotype::Healthy
    } else if ratio > carrier {
        Genotype::Uncertain
    } else if ratio > PATIENT_RATIO_CEILING {
        Genotype::Carrier
    } else {
        Genotype::Patient
    }
}

#[derive(Debug, Clone)]
pub struct WellRecord {
    pub well: WellId,
    pub react_id: u8,
    pub barcode: String,
    pub patient_name: String,
    pub fam_ct: Option<f64>,
    pub hex_ct: Option<f64>,
    pub delta_ct: Option<f64>,
    pub fam_curve: Vec<CurvePoint>,
    pub hex_curve: Vec<CurvePoint>,
    pub fam_endpoint: f64,
    pub hex_endpoint: f64,
    pub endpoint_diff: f64,
    pub warning: Warning,
    pub regression: RegressionClass,
    pub reference_ratio: Option<f64>,
    pub reference_call: Option<Genotype>,
    pub software_ratio: Option<f64>,
    pub software_call: Option<Genotype>,
    pub final_call: Option<Genotype>,
    pub patient_number: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Plate {
    pub wells: Vec<WellRecord>,
}

impl Plate {
    pub fn new(wells: Vec<WellRecord>) -> Self {
        Self { wells }
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        if self.wells.len() != PLATE_WELLS {
            return false;
        }
        let mut seen = [false; PLATE_WELLS];
        for w in &self.wells {
            let idx = w.react_id as usize;
            if !(1..=PLATE_WELLS).contains(&idx) || seen[idx - 1] {
                return false;
            }
            seen[idx - 1] = true;
        }
        true
    }

    pub fn get(&self, well: WellId) -> Option<&WellRecord> {
        self.wells.iter().find(|w| w.well == well)
    }
}
