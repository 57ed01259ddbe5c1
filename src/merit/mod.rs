//! Merit indices used as the switching-plan fitness.
//!
//! Four normalized penalties are combined with external weights:
//!
//! | Index | Meaning | Depends on order |
//! |-------|---------|------------------|
//! | `LF` | loss of loading margin at protection devices | no |
//! | `CD` | crew travel time | yes |
//! | `OD` | customer-minutes of outage during switching | yes |
//! | `NS` | number of operations, automatic ones weighted double | no |
//!
//! Lower is better for every index and for their weighted sum `FF`.

mod auxiliary;
mod evaluator;

pub use auxiliary::{AuxiliaryOperations, PassThrough};
pub use evaluator::MeritIndexEvaluator;

/// Penalty assigned when a capped quantity exceeds its cap.
pub const PENALTY: f64 = 1000.0;

/// Crew travel time cap, in minutes.
pub const MAX_CREW_MINUTES: f64 = 120.0;

/// Operation count cap.
pub const MAX_SWITCH_OPERATIONS: usize = 30;

/// Outage duration cap, in the units of the travel-time matrix.
pub const MAX_OUTAGE_DURATION: f64 = 30.0;

/// Weighting coefficients for the four merit indices.
///
/// # Examples
///
/// ```
/// use u_restoration::merit::MeritWeights;
///
/// let w = MeritWeights::default().with_crew_displacement(2.0);
/// assert_eq!(w.k_cd, 2.0);
/// assert_eq!(w.k_lf, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeritWeights {
    pub k_lf: f64,
    pub k_cd: f64,
    pub k_od: f64,
    pub k_ns: f64,
}

impl Default for MeritWeights {
    fn default() -> Self {
        Self {
            k_lf: 1.0,
            k_cd: 1.0,
            k_od: 1.0,
            k_ns: 1.0,
        }
    }
}

impl MeritWeights {
    pub fn new(k_lf: f64, k_cd: f64, k_od: f64, k_ns: f64) -> Self {
        Self {
            k_lf,
            k_cd,
            k_od,
            k_ns,
        }
    }

    pub fn with_load_flow(mut self, k: f64) -> Self {
        self.k_lf = k;
        self
    }

    pub fn with_crew_displacement(mut self, k: f64) -> Self {
        self.k_cd = k;
        self
    }

    pub fn with_outage_duration(mut self, k: f64) -> Self {
        self.k_od = k;
        self
    }

    pub fn with_number_of_switchings(mut self, k: f64) -> Self {
        self.k_ns = k;
        self
    }

    /// Validates that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        for (name, k) in [
            ("k_lf", self.k_lf),
            ("k_cd", self.k_cd),
            ("k_od", self.k_od),
            ("k_ns", self.k_ns),
        ] {
            if !k.is_finite() || k < 0.0 {
                return Err(format!("{name} must be finite and non-negative (got {k})"));
            }
        }
        Ok(())
    }
}

/// Fitness breakdown of a switching plan.
///
/// Components are stored already multiplied by their weights, so
/// `ff == lf + cd + od + ns`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeritIndex {
    pub lf: f64,
    pub cd: f64,
    pub od: f64,
    pub ns: f64,
    pub ff: f64,
}

impl MeritIndex {
    /// Weights raw index values and sums them.
    pub fn weighted(lf: f64, cd: f64, od: f64, ns: f64, weights: &MeritWeights) -> Self {
        let lf = weights.k_lf * lf;
        let cd = weights.k_cd * cd;
        let od = weights.k_od * od;
        let ns = weights.k_ns * ns;
        Self {
            lf,
            cd,
            od,
            ns,
            ff: lf + cd + od + ns,
        }
    }
}
