use std::collections::BTreeMap;

use super::tables::{DutyTable, GstRates, SubsidyRates};
use super::types::{
    ConsumerImpact, FuelType, GstImpact, ImpactLevel, ImportDutyImpact, IndustryImpact,
    PolicyDelta, SamplePriceChange, SubsidyImpact, SubsidyInputs,
};
use crate::error::{EngineError, EngineResult, require_non_negative};

const SAMPLE_PRODUCT_PRICES: [f64; 3] = [10_000.0, 50_000.0, 100_000.0];
const MAX_PURCHASE_DELAY_PERCENTAGE: f64 = 50.0;
const EMPLOYMENT_PER_BOOST: f64 = 0.3;
const COMPETITIVENESS_PER_BOOST: f64 = 0.5;

impl PolicyDelta {
    /// Monthly figures in, annualized delta out.
    pub fn monthly(current: f64, new: f64) -> Self {
        let delta = new - current;
        Self {
            current,
            new,
            delta,
            monthly_delta: delta,
            annual_delta: delta * 12.0,
        }
    }
}

/// GST contained in a GST-inclusive amount.
pub fn gst_portion(amount: f64, rate: f64) -> f64 {
    amount * rate / (1.0 + rate)
}

/// `new_rates` are fractions (0.12 for 12%); categories missing from it keep
/// their current rate.
pub fn simulate_gst(
    expenses: &BTreeMap<String, f64>,
    new_rates: &BTreeMap<String, f64>,
    rates: &GstRates,
) -> EngineResult<GstImpact> {
    if expenses.values().any(|amount| !amount.is_finite() || *amount < 0.0) {
        return Err(EngineError::invalid("expense_categories", "amounts must be >= 0"));
    }
    if new_rates.values().any(|rate| !rate.is_finite() || *rate < 0.0) {
        return Err(EngineError::invalid("gst_rate_change", "rates must be >= 0"));
    }

    let mut current_total = 0.0;
    let mut new_total = 0.0;
    let mut category_wise_impact = BTreeMap::new();

    for (category, amount) in expenses {
        let current_rate = rates.rate_for(category);
        let new_rate = new_rates.get(category).copied().unwrap_or(current_rate);
        let current = gst_portion(*amount, current_rate);
        let new = gst_portion(*amount, new_rate);
        current_total += current;
        new_total += new;
        category_wise_impact.insert(category.clone(), PolicyDelta::monthly(current, new));
    }

    Ok(GstImpact {
        totals: PolicyDelta::monthly(current_total, new_total),
        category_wise_impact,
    })
}

pub fn simulate_subsidy(inputs: &SubsidyInputs, rates: &SubsidyRates) -> EngineResult<SubsidyImpact> {
    require_non_negative("monthly_fuel_consumption", inputs.monthly_fuel_liters)?;
    if let Some(value) = inputs.new_fuel_subsidy {
        require_non_negative("subsidy_change.fuel", value)?;
    }
    if let Some(value) = inputs.new_lpg_subsidy {
        require_non_negative("subsidy_change.lpg", value)?;
    }

    let current_fuel_rate = match inputs.fuel {
        FuelType::Petrol => rates.petrol_per_liter,
        FuelType::Diesel => rates.diesel_per_liter,
    };
    let new_fuel_rate = inputs.new_fuel_subsidy.unwrap_or(current_fuel_rate);
    let new_lpg_rate = inputs.new_lpg_subsidy.unwrap_or(rates.lpg_per_cylinder);
    let cylinders = inputs.lpg_cylinders as f64;

    let fuel = PolicyDelta::monthly(
        inputs.monthly_fuel_liters * current_fuel_rate,
        inputs.monthly_fuel_liters * new_fuel_rate,
    );
    let lpg = PolicyDelta::monthly(
        cylinders * rates.lpg_per_cylinder,
        cylinders * new_lpg_rate,
    );

    Ok(SubsidyImpact {
        totals: PolicyDelta::monthly(fuel.current + lpg.current, fuel.new + lpg.new),
        fuel,
        lpg,
    })
}

/// Percent-point duty change passed through to shelf price and demand.
pub fn simulate_import_duty(
    category: &str,
    duty_change_percentage: f64,
    current_duty_percentage: f64,
    table: &DutyTable,
) -> EngineResult<ImportDutyImpact> {
    if !duty_change_percentage.is_finite() {
        return Err(EngineError::invalid("duty_change_percentage", "must be a finite number"));
    }
    require_non_negative("current_duty_percentage", current_duty_percentage)?;

    let (profile_category, profile) = table.profile_for(category);
    let price_impact = duty_change_percentage * profile.price_multiplier;
    let demand_change = price_impact * profile.demand_elasticity;
    let domestic_boost = duty_change_percentage * profile.domestic_boost;

    let sample_prices = SAMPLE_PRODUCT_PRICES
        .iter()
        .map(|base| SamplePriceChange {
            base_price: *base,
            new_price: base * (1.0 + price_impact / 100.0),
        })
        .collect();

    Ok(ImportDutyImpact {
        product_category: category.to_string(),
        profile_category,
        current_duty_percentage,
        new_duty_percentage: current_duty_percentage + duty_change_percentage,
        duty_change_percentage,
        price_impact_percentage: price_impact,
        demand_change_percentage: demand_change,
        domestic_production_boost_percentage: domestic_boost,
        import_volume_change_percentage: demand_change * table.import_volume_factor,
        affordability_impact: affordability(price_impact),
        sample_prices,
        consumer_impact: consumer_impact(price_impact),
        industry_impact: industry_impact(domestic_boost),
        recommendations: duty_recommendations(duty_change_percentage, category),
    })
}

fn affordability(price_impact: f64) -> ImpactLevel {
    if price_impact > 10.0 {
        ImpactLevel::High
    } else if price_impact > 5.0 {
        ImpactLevel::Moderate
    } else {
        ImpactLevel::Low
    }
}

fn consumer_impact(price_impact: f64) -> ConsumerImpact {
    ConsumerImpact {
        price_increase_percentage: price_impact,
        affordability_impact: affordability(price_impact),
        substitution_likelihood: if price_impact > 15.0 {
            ImpactLevel::High
        } else {
            ImpactLevel::Moderate
        },
        purchase_delay_probability_percentage: (price_impact * 2.0)
            .clamp(0.0, MAX_PURCHASE_DELAY_PERCENTAGE),
    }
}

fn industry_impact(domestic_boost: f64) -> IndustryImpact {
    IndustryImpact {
        domestic_production_boost_percentage: domestic_boost,
        employment_change_percentage: domestic_boost * EMPLOYMENT_PER_BOOST,
        investment_attraction: if domestic_boost > 20.0 {
            ImpactLevel::High
        } else {
            ImpactLevel::Moderate
        },
        competitiveness_improvement_percentage: domestic_boost * COMPETITIVENESS_PER_BOOST,
    }
}

fn duty_recommendations(duty_change: f64, category: &str) -> Vec<String> {
    if duty_change > 0.0 {
        vec![
            format!("Consider purchasing {category} items before price increases"),
            "Explore domestic alternatives for better value".to_string(),
            "Budget for higher prices in future purchases".to_string(),
            "Look for bulk purchase opportunities".to_string(),
        ]
    } else {
        vec![
            format!("Good time to purchase imported {category} items"),
            "Compare prices between domestic and imported options".to_string(),
            "Consider upgrading to better quality imports".to_string(),
            "Plan major purchases to maximize savings".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn gst_portion_extracts_inclusive_tax() {
        assert_approx(gst_portion(1_180.0, 0.18), 180.0);
        assert_approx(gst_portion(1_000.0, 0.0), 0.0);
    }

    #[test]
    fn gst_rate_cut_on_electronics() {
        let impact = simulate_gst(
            &map(&[("electronics", 11_800.0), ("food", 10_500.0)]),
            &map(&[("electronics", 0.12)]),
            &GstRates::default(),
        )
        .expect("valid inputs");

        let electronics = impact.category_wise_impact["electronics"];
        assert_approx(electronics.current, 1_800.0);
        assert_approx(electronics.new, 11_800.0 * 0.12 / 1.12);
        assert_approx(impact.category_wise_impact["food"].delta, 0.0);
        assert_approx(impact.totals.current, 1_800.0 + 500.0);
        assert_approx(impact.totals.annual_delta, impact.totals.monthly_delta * 12.0);
        assert!(impact.totals.delta < 0.0);
    }

    #[test]
    fn unknown_gst_category_defaults_to_eighteen_percent() {
        let impact = simulate_gst(
            &map(&[("jewellery", 1_180.0)]),
            &BTreeMap::new(),
            &GstRates::default(),
        )
        .expect("valid inputs");
        assert_approx(impact.totals.current, 180.0);
        assert_approx(impact.totals.delta, 0.0);
    }

    #[test]
    fn subsidy_uses_fuel_type_and_request_overrides() {
        let impact = simulate_subsidy(
            &SubsidyInputs {
                monthly_fuel_liters: 40.0,
                fuel: FuelType::Diesel,
                lpg_cylinders: 1,
                new_fuel_subsidy: Some(5.0),
                new_lpg_subsidy: None,
            },
            &SubsidyRates::default(),
        )
        .expect("valid inputs");

        assert_approx(impact.fuel.current, 600.0);
        assert_approx(impact.fuel.new, 200.0);
        assert_approx(impact.lpg.delta, 0.0);
        assert_approx(impact.totals.current, 800.0);
        assert_approx(impact.totals.new, 400.0);
        assert_approx(impact.totals.annual_delta, -4_800.0);
    }

    #[test]
    fn import_duty_hike_on_automobiles() {
        let impact =
            simulate_import_duty("automobiles", 10.0, 15.0, &DutyTable::default()).expect("valid");
        assert_approx(impact.price_impact_percentage, 9.0);
        assert_approx(impact.demand_change_percentage, -7.2);
        assert_approx(impact.domestic_production_boost_percentage, 6.0);
        assert_approx(impact.import_volume_change_percentage, -7.2 * 0.7);
        assert_approx(impact.new_duty_percentage, 25.0);
        assert_eq!(impact.affordability_impact, ImpactLevel::Moderate);
        assert_approx(impact.sample_prices[0].new_price, 10_900.0);
        assert_eq!(impact.consumer_impact.substitution_likelihood, ImpactLevel::Moderate);
        assert_approx(impact.consumer_impact.purchase_delay_probability_percentage, 18.0);
        assert_approx(impact.industry_impact.employment_change_percentage, 1.8);
        assert_approx(impact.industry_impact.competitiveness_improvement_percentage, 3.0);
        assert_eq!(impact.industry_impact.investment_attraction, ImpactLevel::Moderate);
        assert!(impact.recommendations[0].contains("before price increases"));
    }

    #[test]
    fn steep_hike_saturates_consumer_and_industry_figures() {
        // 40 points on automobiles: 36% price rise, 24% domestic boost.
        let impact =
            simulate_import_duty("automobiles", 40.0, 10.0, &DutyTable::default()).expect("valid");
        let consumer = impact.consumer_impact;
        assert_eq!(consumer.affordability_impact, ImpactLevel::High);
        assert_eq!(consumer.substitution_likelihood, ImpactLevel::High);
        assert_approx(consumer.purchase_delay_probability_percentage, 50.0);
        assert_eq!(impact.industry_impact.investment_attraction, ImpactLevel::High);
        assert_approx(impact.industry_impact.employment_change_percentage, 24.0 * 0.3);
    }

    #[test]
    fn duty_cut_never_reports_negative_purchase_delay() {
        let impact =
            simulate_import_duty("textiles", -10.0, 20.0, &DutyTable::default()).expect("valid");
        assert_approx(impact.consumer_impact.price_increase_percentage, -7.0);
        assert_approx(impact.consumer_impact.purchase_delay_probability_percentage, 0.0);
        assert_approx(impact.industry_impact.domestic_production_boost_percentage, -3.0);
        assert!(impact.recommendations[0].starts_with("Good time to purchase"));
    }

    #[test]
    fn unknown_duty_category_uses_electronics_profile() {
        let impact =
            simulate_import_duty("toys", 5.0, 10.0, &DutyTable::default()).expect("valid");
        assert_eq!(impact.profile_category, "electronics");
        assert_eq!(impact.product_category, "toys");
        assert_approx(impact.price_impact_percentage, 4.0);
    }

    proptest! {
        #[test]
        fn prop_zero_duty_change_has_no_impact(
            category_idx in 0usize..6,
            current_duty in 0u32..150,
        ) {
            let category = ["electronics", "automobiles", "textiles", "machinery", "toys", ""][category_idx];
            let impact = simulate_import_duty(category, 0.0, current_duty as f64, &DutyTable::default())
                .expect("valid inputs");
            prop_assert_eq!(impact.price_impact_percentage, 0.0);
            prop_assert!(impact.demand_change_percentage == 0.0);
            prop_assert_eq!(impact.new_duty_percentage, current_duty as f64);
        }
    }
}
