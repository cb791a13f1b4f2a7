use crate::error::Error;

pub const DEFAULT_CARRIER_THRESHOLD: f64 = 0.5999;
pub const DEFAULT_UNCERTAIN_THRESHOLD: f64 = 0.6199;
pub const DEFAULT_CLUSTER_COUNT: usize = 5;

// thresholds are private so carrier < uncertain holds at mutation time
#[derive(Debug, Clone)]
pub struct CalibrationConfig {
    pub reference_well: Option<String>,
    carrier_threshold: f64,
    uncertain_threshold: f64,
    pub use_software_result: bool,
    pub cluster_count: usize,
}

impl CalibrationConfig {
    pub fn new(carrier_threshold: f64, uncertain_threshold: f64) -> Result<Self, Error> {
        validate_thresholds(carrier_threshold, uncertain_threshold)?;
        Ok(Self {
            reference_well: None,
            carrier_threshold,
            uncertain_threshold,
            use_software_result: false,
            cluster_count: DEFAULT_CLUSTER_COUNT,
        })
    }

    pub fn carrier_threshold(&self) -> f64 {
        self.carrier_threshold
    }

    pub fn uncertain_threshold(&self) -> f64 {
        self.uncertain_threshold
    }

    pub fn set_thresholds(
        &mut self,
        carrier_threshold: f64,
        uncertain_threshold: f64,
    ) -> Result<(), Error> {
        validate_thresholds(carrier_threshold, uncertain_threshold)?;
        self.carrier_threshold = carrier_threshold;
        self.uncertain_threshold = uncertain_threshold;
        Ok(())
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            reference_well: None,
            carrier_threshold: DEFAULT_CARRIER_THRESHOLD,
            uncertain_threshold: DEFAULT_UNCERTAIN_THRESHOLD,
            use_software_result: false,
            cluster_count: DEFAULT_CLUSTER_COUNT,
        }
    }
}

fn validate_thresholds(carrier: f64, uncertain: f64) -> Result<(), Error> {
    if !carrier.is_finite() || !uncertain.is_finite() {
        return Err(Error::Validation(format!(
            "thresholds must be finite, got carrier={carrier} uncertain={uncertain}"
        )));
    }
    if carrier >= uncertain {
        return Err(Error::Validation(format!(
            "carrier threshold {carrier} must be below uncertain threshold {uncertain}"
        )));
    }
    Ok(())
}
