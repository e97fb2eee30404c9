use serde::Serialize;

use super::types::{DutyProfile, IdealBand, TaxBracket};
use crate::error::{EngineError, EngineResult};

/// Read-only reference data shared by every engine call.
///
/// Built once at start-up and handed to the engines by reference, so tests can
/// swap in alternate schedules without touching any global state.
#[derive(Debug, Clone)]
pub struct EngineTables {
    pub tax: TaxSchedule,
    pub budget: BudgetBands,
    pub gst: GstRates,
    pub subsidy: SubsidyRates,
    pub duty: DutyTable,
    pub insurance: InsuranceFactors,
    pub ppf: PpfTerms,
}

impl Default for EngineTables {
    fn default() -> Self {
        Self {
            tax: TaxSchedule::default(),
            budget: BudgetBands::default(),
            gst: GstRates::default(),
            subsidy: SubsidyRates::default(),
            duty: DutyTable::default(),
            insurance: InsuranceFactors::default(),
            ppf: PpfTerms::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxSchedule {
    pub brackets: Vec<TaxBracket>,
    pub cess_rate: f64,
    pub section_80c_cap: f64,
    pub section_80d_hint: f64,
    pub standard_deduction: f64,
}

impl TaxSchedule {
    /// Brackets must start at zero, each must begin where the previous ends with
    /// `upper > lower`, only the last may be unbounded, and every rate lies in `[0, 1]`.
    pub fn validate(&self) -> EngineResult<()> {
        const FIELD: &str = "tax_schedule";
        let Some(first) = self.brackets.first() else {
            return Err(EngineError::invalid(FIELD, "must have at least one bracket"));
        };
        if first.lower != 0.0 {
            return Err(EngineError::invalid(FIELD, "must start at zero"));
        }
        let last = self.brackets.len() - 1;
        for (idx, bracket) in self.brackets.iter().enumerate() {
            if !bracket.rate.is_finite() || !(0.0..=1.0).contains(&bracket.rate) {
                return Err(EngineError::invalid(FIELD, "rates must be between 0 and 1"));
            }
            match bracket.upper {
                Some(upper) if upper > bracket.lower => {}
                Some(_) => {
                    return Err(EngineError::invalid(FIELD, "bracket upper must exceed lower"));
                }
                None if idx == last => {}
                None => {
                    return Err(EngineError::invalid(FIELD, "only the last bracket may be open"));
                }
            }
            if let Some(next) = self.brackets.get(idx + 1) {
                if bracket.upper != Some(next.lower) {
                    return Err(EngineError::invalid(FIELD, "brackets must be contiguous"));
                }
            }
        }
        if !self.cess_rate.is_finite() || self.cess_rate < 0.0 {
            return Err(EngineError::invalid(FIELD, "cess rate must be >= 0"));
        }
        Ok(())
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        let bounds = [
            (0.0, Some(300_000.0), 0.0),
            (300_000.0, Some(600_000.0), 0.05),
            (600_000.0, Some(900_000.0), 0.10),
            (900_000.0, Some(1_200_000.0), 0.15),
            (1_200_000.0, Some(1_500_000.0), 0.20),
            (1_500_000.0, None, 0.30),
        ];
        Self {
            brackets: bounds
                .into_iter()
                .map(|(lower, upper, rate)| TaxBracket { lower, upper, rate })
                .collect(),
            cess_rate: 0.04,
            section_80c_cap: 150_000.0,
            section_80d_hint: 25_000.0,
            standard_deduction: 50_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BudgetBands {
    pub essential: IdealBand,
    pub discretionary: IdealBand,
    pub savings: IdealBand,
    pub debt: IdealBand,
    /// Slack above `max` that still counts as a warning.
    pub warning_margin: f64,
}

impl Default for BudgetBands {
    fn default() -> Self {
        Self {
            essential: IdealBand::new(50.0, 55.0, 52.0),
            discretionary: IdealBand::new(20.0, 25.0, 22.0),
            savings: IdealBand::new(20.0, 30.0, 25.0),
            debt: IdealBand::new(0.0, 10.0, 5.0),
            warning_margin: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GstRates {
    pub rates: Vec<(&'static str, f64)>,
    pub fallback: f64,
}

impl GstRates {
    pub fn rate_for(&self, category: &str) -> f64 {
        self.rates
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, rate)| *rate)
            .unwrap_or(self.fallback)
    }
}

impl Default for GstRates {
    fn default() -> Self {
        Self {
            rates: vec![
                ("food", 0.05),
                ("clothing", 0.12),
                ("electronics", 0.18),
                ("fuel", 0.28),
                ("services", 0.18),
                ("medicines", 0.05),
                ("education", 0.0),
            ],
            fallback: 0.18,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubsidyRates {
    pub petrol_per_liter: f64,
    pub diesel_per_liter: f64,
    pub lpg_per_cylinder: f64,
}

impl Default for SubsidyRates {
    fn default() -> Self {
        Self {
            petrol_per_liter: 10.0,
            diesel_per_liter: 15.0,
            lpg_per_cylinder: 200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DutyTable {
    pub profiles: Vec<(&'static str, DutyProfile)>,
    pub fallback: &'static str,
    /// Share of the demand change that shows up in import volume.
    pub import_volume_factor: f64,
}

impl DutyTable {
    /// Returns the profile for `category`, or the fallback category's profile.
    pub fn profile_for(&self, category: &str) -> (&'static str, DutyProfile) {
        let lookup = |wanted: &str| {
            self.profiles
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .copied()
        };
        lookup(category)
            .or_else(|| lookup(self.fallback))
            .unwrap_or((self.fallback, DutyProfile::NEUTRAL))
    }
}

impl Default for DutyTable {
    fn default() -> Self {
        Self {
            profiles: vec![
                ("electronics", DutyProfile::new(0.8, -0.6, 0.4)),
                ("automobiles", DutyProfile::new(0.9, -0.8, 0.6)),
                ("textiles", DutyProfile::new(0.7, -0.4, 0.3)),
                ("machinery", DutyProfile::new(0.85, -0.3, 0.2)),
            ],
            fallback: "electronics",
            import_volume_factor: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InsuranceFactors {
    pub life_cover_multiple: f64,
    pub base_health_cover: f64,
    pub health_cover_per_dependent: f64,
    pub health_cover_income_share: f64,
    pub life_premium_rate: f64,
    pub health_premium_rate: f64,
}

impl Default for InsuranceFactors {
    fn default() -> Self {
        Self {
            life_cover_multiple: 10.0,
            base_health_cover: 500_000.0,
            health_cover_per_dependent: 200_000.0,
            health_cover_income_share: 0.5,
            life_premium_rate: 0.002,
            health_premium_rate: 0.03,
        }
    }
}

/// Statutory PPF terms; the instrument ignores the requested rate.
#[derive(Debug, Clone, Copy)]
pub struct PpfTerms {
    pub annual_rate_percent: f64,
    pub max_years: u32,
}

impl Default for PpfTerms {
    fn default() -> Self {
        Self {
            annual_rate_percent: 7.1,
            max_years: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tax_schedule_is_contiguous_and_ascending() {
        let schedule = TaxSchedule::default();
        assert_eq!(schedule.brackets.len(), 6);
        assert!(schedule.validate().is_ok());
        let rates: Vec<f64> = schedule.brackets.iter().map(|b| b.rate).collect();
        assert_eq!(rates, vec![0.0, 0.05, 0.10, 0.15, 0.20, 0.30]);
    }

    fn rejection(schedule: &TaxSchedule) -> String {
        schedule.validate().expect_err("invalid schedule").to_string()
    }

    #[test]
    fn gapped_schedule_is_rejected() {
        let mut schedule = TaxSchedule::default();
        schedule.brackets[2].lower = 650_000.0;
        assert_eq!(rejection(&schedule), "tax_schedule brackets must be contiguous");
    }

    #[test]
    fn inverted_bracket_is_rejected() {
        let mut schedule = TaxSchedule::default();
        schedule.brackets[1].upper = Some(200_000.0);
        schedule.brackets[2].lower = 200_000.0;
        assert_eq!(
            rejection(&schedule),
            "tax_schedule bracket upper must exceed lower"
        );
    }

    #[test]
    fn open_bracket_before_the_end_is_rejected() {
        let mut schedule = TaxSchedule::default();
        schedule.brackets[3].upper = None;
        assert_eq!(
            rejection(&schedule),
            "tax_schedule only the last bracket may be open"
        );
    }

    #[test]
    fn empty_schedule_and_bad_rates_are_rejected() {
        let mut schedule = TaxSchedule::default();
        schedule.brackets[5].rate = 1.5;
        assert_eq!(rejection(&schedule), "tax_schedule rates must be between 0 and 1");

        schedule.brackets.clear();
        assert_eq!(
            rejection(&schedule),
            "tax_schedule must have at least one bracket"
        );
    }

    #[test]
    fn gst_lookup_falls_back_to_eighteen_percent() {
        let gst = GstRates::default();
        assert_eq!(gst.rate_for("food"), 0.05);
        assert_eq!(gst.rate_for("Education"), 0.0);
        assert_eq!(gst.rate_for("jewellery"), 0.18);
    }

    #[test]
    fn duty_lookup_falls_back_to_electronics() {
        let table = DutyTable::default();
        let (name, profile) = table.profile_for("furniture");
        assert_eq!(name, "electronics");
        assert_eq!(profile.price_multiplier, 0.8);
        assert_eq!(table.profile_for("machinery").1.demand_elasticity, -0.3);
    }
}
