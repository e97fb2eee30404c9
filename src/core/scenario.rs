use super::policy::simulate_import_duty;
use super::tables::DutyTable;
use super::types::{
    BusinessImpact, ChannelImpact, EconomicEffect, HouseholdImpact, IncomeBracket, NamedScenario,
    PolicyScenario, SampleTaxChange, ScenarioComparison, ScenarioOutcome, ScenarioResult,
    SectorSubsidyImpact, SubsidySector, TaxRateChangeImpact,
};
use crate::error::{EngineError, EngineResult};

pub const MAX_SCENARIOS: usize = 5;
pub const DEFAULT_DUTY_CATEGORY: &str = "electronics";
pub const DEFAULT_CURRENT_DUTY_PERCENTAGE: f64 = 10.0;

const SAMPLE_INCOMES: [f64; 5] = [300_000.0, 600_000.0, 800_000.0, 1_200_000.0, 2_000_000.0];
/// Household income is taken as twenty months of spend on the subsidized item.
const INCOME_TO_SPEND_MULTIPLE: f64 = 20.0;

impl IncomeBracket {
    /// `(lower, upper, flat rate in percent)`; both bounds inclusive.
    pub fn band(self) -> (f64, f64, f64) {
        match self {
            IncomeBracket::Low => (0.0, 500_000.0, 5.0),
            IncomeBracket::Middle => (500_000.0, 1_000_000.0, 20.0),
            IncomeBracket::High => (1_000_000.0, f64::INFINITY, 30.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeBracket::Low => "Low",
            IncomeBracket::Middle => "Middle",
            IncomeBracket::High => "High",
        }
    }
}

impl SubsidySector {
    /// Unknown names fall back to fuel.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "fertilizer" => SubsidySector::Fertilizer,
            "electricity" => SubsidySector::Electricity,
            _ => SubsidySector::Fuel,
        }
    }

    fn indirect_multipliers(self) -> &'static [(&'static str, f64)] {
        match self {
            SubsidySector::Fuel => &[
                ("transportation_cost", 1.2),
                ("food_prices", 0.3),
                ("electricity_cost", 0.15),
            ],
            SubsidySector::Fertilizer => &[
                ("crop_production_cost", 0.8),
                ("food_prices", 0.5),
                ("farmer_income", -0.6),
            ],
            SubsidySector::Electricity => &[
                ("manufacturing_cost", 0.4),
                ("household_expenses", 1.0),
                ("business_operations", 0.6),
            ],
        }
    }

    fn affected_sectors(self) -> &'static [&'static str] {
        match self {
            SubsidySector::Fuel => &["Transportation", "Agriculture", "Manufacturing"],
            SubsidySector::Fertilizer => &["Agriculture", "Food Processing", "Rural Economy"],
            SubsidySector::Electricity => &["Manufacturing", "Services", "Households"],
        }
    }

    /// Monthly household spend on the item, per segment.
    fn household_spend(self) -> &'static [(&'static str, f64)] {
        match self {
            SubsidySector::Fuel => &[
                ("low_income", 2_000.0),
                ("middle_income", 4_000.0),
                ("high_income", 8_000.0),
            ],
            SubsidySector::Electricity => &[
                ("low_income", 1_500.0),
                ("middle_income", 3_000.0),
                ("high_income", 6_000.0),
            ],
            SubsidySector::Fertilizer => &[("rural", 500.0), ("urban", 0.0)],
        }
    }

    fn business_multipliers(self) -> &'static [(&'static str, f64)] {
        match self {
            SubsidySector::Fuel => &[
                ("transportation_companies", 0.8),
                ("manufacturing", 0.3),
                ("agriculture", 0.4),
            ],
            SubsidySector::Electricity => &[
                ("manufacturing", 0.6),
                ("services", 0.2),
                ("retail", 0.3),
            ],
            SubsidySector::Fertilizer => &[],
        }
    }
}

/// Flat-rate tax on each sample income inside `bracket`, before and after
/// moving the bracket rate by `change_percentage` points.
pub fn simulate_tax_rate_change(
    policy_type: &str,
    bracket: IncomeBracket,
    change_percentage: f64,
) -> EngineResult<TaxRateChangeImpact> {
    let (lower, upper, current_rate) = bracket.band();
    let new_rate = current_rate + change_percentage;
    if !change_percentage.is_finite() || !(0.0..=100.0).contains(&new_rate) {
        return Err(EngineError::invalid(
            "change_percentage",
            "must keep the bracket rate between 0 and 100",
        ));
    }

    let impact_analysis: Vec<SampleTaxChange> = SAMPLE_INCOMES
        .iter()
        .filter(|income| (lower..=upper).contains(*income))
        .map(|&income| {
            let current_tax = income * current_rate / 100.0;
            let new_tax = income * new_rate / 100.0;
            let annual_savings = current_tax - new_tax;
            SampleTaxChange {
                income,
                current_tax,
                new_tax,
                annual_savings,
                monthly_savings: annual_savings / 12.0,
                percentage_change: if current_tax > 0.0 {
                    annual_savings / current_tax * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let average_annual_savings = if impact_analysis.is_empty() {
        0.0
    } else {
        impact_analysis.iter().map(|row| row.annual_savings).sum::<f64>()
            / impact_analysis.len() as f64
    };

    Ok(TaxRateChangeImpact {
        policy_type: policy_type.to_string(),
        income_bracket: bracket,
        change_percentage,
        current_rate,
        new_rate,
        impact_analysis,
        average_annual_savings,
        economic_effect: if change_percentage < 0.0 {
            EconomicEffect::Positive
        } else {
            EconomicEffect::Negative
        },
        recommendations: tax_change_recommendations(change_percentage),
    })
}

fn tax_change_recommendations(change_percentage: f64) -> Vec<String> {
    let lines: [&str; 4] = if change_percentage < 0.0 {
        [
            "Consider increasing investments in tax-saving instruments",
            "Review and optimize your tax planning strategy",
            "Explore additional income sources to maximize benefits",
            "Consider upgrading lifestyle within new tax savings",
        ]
    } else {
        [
            "Maximize deductions under Section 80C, 80D",
            "Consider switching to new tax regime if beneficial",
            "Plan major purchases before tax implementation",
            "Explore tax-efficient investment options",
        ]
    };
    lines.map(String::from).into()
}

/// Knock-on effects of a per-unit subsidy change of `amount_change` rupees.
pub fn simulate_sector_subsidy(
    subsidy_type: &str,
    amount_change: f64,
) -> EngineResult<SectorSubsidyImpact> {
    if !amount_change.is_finite() {
        return Err(EngineError::invalid("amount_change", "must be a finite number"));
    }
    let sector = SubsidySector::from_name(subsidy_type);

    let indirect_impacts = sector
        .indirect_multipliers()
        .iter()
        .map(|&(channel, multiplier)| ChannelImpact {
            channel,
            amount: amount_change * multiplier,
        })
        .collect();

    let household_impact = sector
        .household_spend()
        .iter()
        .map(|&(segment, monthly_spend)| {
            let monthly_savings = amount_change / 100.0 * monthly_spend;
            let annual_savings = monthly_savings * 12.0;
            let annual_income = monthly_spend * INCOME_TO_SPEND_MULTIPLE;
            HouseholdImpact {
                segment,
                monthly_savings,
                annual_savings,
                percentage_of_income: if annual_income > 0.0 {
                    annual_savings / annual_income * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let business_impact = sector
        .business_multipliers()
        .iter()
        .map(|&(segment, multiplier)| BusinessImpact {
            segment,
            cost_change_percentage: amount_change * multiplier,
        })
        .collect();

    Ok(SectorSubsidyImpact {
        subsidy_type: subsidy_type.to_string(),
        sector_profile: sector,
        change_amount: amount_change,
        direct_impact: amount_change,
        indirect_impacts,
        affected_sectors: sector.affected_sectors().to_vec(),
        household_impact,
        business_impact,
        recommendations: subsidy_recommendations(subsidy_type, amount_change),
    })
}

fn subsidy_recommendations(subsidy_type: &str, amount_change: f64) -> Vec<String> {
    if amount_change > 0.0 {
        vec![
            format!("Take advantage of reduced {subsidy_type} costs"),
            "Consider increasing consumption/usage efficiently".to_string(),
            "Plan long-term investments in related areas".to_string(),
            "Budget the savings for other financial goals".to_string(),
        ]
    } else {
        vec![
            format!("Budget for increased {subsidy_type} expenses"),
            "Look for alternative/efficient options".to_string(),
            "Consider bulk purchases before price increases".to_string(),
            "Adjust monthly budget to accommodate changes".to_string(),
        ]
    }
}

/// Runs each scenario through its simulator, in request order.
pub fn compare_scenarios(
    scenarios: &[NamedScenario],
    duty_table: &DutyTable,
) -> EngineResult<ScenarioComparison> {
    if scenarios.is_empty() {
        return Err(EngineError::invalid("scenarios", "must not be empty"));
    }
    if scenarios.len() > MAX_SCENARIOS {
        return Err(EngineError::invalid("scenarios", "must contain at most 5 entries"));
    }

    let results = scenarios
        .iter()
        .enumerate()
        .map(|(idx, named)| -> EngineResult<ScenarioResult> {
            let scenario_id = idx + 1;
            let (scenario_type, results) = match &named.scenario {
                PolicyScenario::Tax {
                    income_bracket,
                    change_percentage,
                } => (
                    "tax",
                    ScenarioOutcome::Tax(simulate_tax_rate_change(
                        "income_tax",
                        *income_bracket,
                        *change_percentage,
                    )?),
                ),
                PolicyScenario::Subsidy {
                    subsidy_type,
                    amount_change,
                } => (
                    "subsidy",
                    ScenarioOutcome::Subsidy(simulate_sector_subsidy(
                        subsidy_type.as_deref().unwrap_or("fuel"),
                        *amount_change,
                    )?),
                ),
                PolicyScenario::ImportDuty {
                    category,
                    duty_change_percentage,
                    current_duty_percentage,
                } => (
                    "import_duty",
                    ScenarioOutcome::ImportDuty(simulate_import_duty(
                        category.as_deref().unwrap_or(DEFAULT_DUTY_CATEGORY),
                        *duty_change_percentage,
                        current_duty_percentage.unwrap_or(DEFAULT_CURRENT_DUTY_PERCENTAGE),
                        duty_table,
                    )?),
                ),
            };
            Ok(ScenarioResult {
                scenario_id,
                scenario_name: named
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Scenario {scenario_id}")),
                scenario_type,
                results,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(ScenarioComparison {
        total_scenarios: results.len(),
        scenarios: results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn named(json: &str) -> NamedScenario {
        serde_json::from_str(json).expect("valid scenario json")
    }

    #[test]
    fn middle_bracket_cut_covers_its_sample_incomes() {
        let impact =
            simulate_tax_rate_change("income_tax", IncomeBracket::Middle, -5.0).expect("valid");
        assert_approx(impact.current_rate, 20.0);
        assert_approx(impact.new_rate, 15.0);
        let incomes: Vec<f64> = impact.impact_analysis.iter().map(|row| row.income).collect();
        assert_eq!(incomes, vec![600_000.0, 800_000.0]);

        let first = impact.impact_analysis[0];
        assert_approx(first.current_tax, 120_000.0);
        assert_approx(first.new_tax, 90_000.0);
        assert_approx(first.annual_savings, 30_000.0);
        assert_approx(first.monthly_savings, 2_500.0);
        assert_approx(first.percentage_change, 25.0);
        assert_approx(impact.average_annual_savings, (30_000.0 + 40_000.0) / 2.0);
        assert_eq!(impact.economic_effect, EconomicEffect::Positive);
        assert!(impact.recommendations[0].contains("tax-saving instruments"));
    }

    #[test]
    fn rate_hike_on_high_earners_is_negative() {
        let impact =
            simulate_tax_rate_change("income_tax", IncomeBracket::High, 5.0).expect("valid");
        assert_eq!(impact.impact_analysis.len(), 2);
        assert_approx(impact.impact_analysis[1].annual_savings, -100_000.0);
        assert_eq!(impact.economic_effect, EconomicEffect::Negative);
        assert!(impact.recommendations[0].contains("80C"));
    }

    #[test]
    fn rate_change_below_zero_is_rejected() {
        let err = simulate_tax_rate_change("income_tax", IncomeBracket::Low, -6.0)
            .expect_err("negative rate");
        assert!(err.to_string().starts_with("change_percentage"));
    }

    #[test]
    fn fuel_subsidy_ripples_through_every_channel() {
        let impact = simulate_sector_subsidy("fuel", 10.0).expect("valid");
        assert_eq!(impact.sector_profile, SubsidySector::Fuel);
        let channels: Vec<(&str, f64)> = impact
            .indirect_impacts
            .iter()
            .map(|c| (c.channel, c.amount))
            .collect();
        assert_eq!(channels[0].0, "transportation_cost");
        assert_approx(channels[0].1, 12.0);
        assert_approx(channels[2].1, 1.5);

        let middle = impact.household_impact[1];
        assert_eq!(middle.segment, "middle_income");
        assert_approx(middle.monthly_savings, 400.0);
        assert_approx(middle.annual_savings, 4_800.0);
        assert_approx(middle.percentage_of_income, 6.0);
        assert_approx(impact.business_impact[0].cost_change_percentage, 8.0);
        assert!(impact.recommendations[0].starts_with("Take advantage"));
    }

    #[test]
    fn fertilizer_cut_lowers_farmer_income_without_dividing_by_zero() {
        let impact = simulate_sector_subsidy("Fertilizer", -20.0).expect("valid");
        assert_eq!(impact.sector_profile, SubsidySector::Fertilizer);
        let farmer = impact
            .indirect_impacts
            .iter()
            .find(|c| c.channel == "farmer_income")
            .expect("farmer channel");
        assert_approx(farmer.amount, 12.0);
        let urban = impact.household_impact[1];
        assert_eq!(urban.segment, "urban");
        assert_approx(urban.percentage_of_income, 0.0);
        assert!(impact.business_impact.is_empty());
        assert!(impact.recommendations[0].starts_with("Budget for increased"));
    }

    #[test]
    fn unknown_subsidy_type_uses_fuel_profile() {
        let impact = simulate_sector_subsidy("water", 5.0).expect("valid");
        assert_eq!(impact.subsidy_type, "water");
        assert_eq!(impact.sector_profile, SubsidySector::Fuel);
    }

    #[test]
    fn comparison_keeps_order_names_and_types() {
        let scenarios = vec![
            named(r#"{"type":"tax","name":"Relief","change_percentage":-2}"#),
            named(r#"{"type":"subsidy","subsidy_type":"electricity","amount_change":5}"#),
            named(r#"{"type":"import_duty","category":"textiles","duty_change_percentage":10}"#),
        ];
        let comparison = compare_scenarios(&scenarios, &DutyTable::default()).expect("valid");
        assert_eq!(comparison.total_scenarios, 3);
        assert_eq!(comparison.scenarios[0].scenario_name, "Relief");
        assert_eq!(comparison.scenarios[1].scenario_name, "Scenario 2");
        let types: Vec<&str> = comparison.scenarios.iter().map(|s| s.scenario_type).collect();
        assert_eq!(types, vec!["tax", "subsidy", "import_duty"]);
        match &comparison.scenarios[2].results {
            ScenarioOutcome::ImportDuty(impact) => {
                assert_approx(impact.current_duty_percentage, 10.0);
                assert_approx(impact.price_impact_percentage, 7.0);
            }
            other => panic!("expected import duty outcome, got {other:?}"),
        }
    }

    #[test]
    fn comparison_is_capped_at_five() {
        let scenarios: Vec<NamedScenario> = (0..6)
            .map(|_| named(r#"{"type":"tax","change_percentage":1}"#))
            .collect();
        let err = compare_scenarios(&scenarios, &DutyTable::default()).expect_err("six scenarios");
        assert_eq!(err.to_string(), "scenarios must contain at most 5 entries");
        assert!(compare_scenarios(&scenarios[..5], &DutyTable::default()).is_ok());
        assert!(compare_scenarios(&[], &DutyTable::default()).is_err());
    }

    #[test]
    fn invalid_scenario_fails_the_whole_comparison() {
        let scenarios = vec![
            named(r#"{"type":"import_duty","duty_change_percentage":5}"#),
            named(r#"{"type":"tax","income_bracket":"low","change_percentage":-50}"#),
        ];
        let err = compare_scenarios(&scenarios, &DutyTable::default()).expect_err("bad tax");
        assert!(err.to_string().starts_with("change_percentage"));
    }
}
