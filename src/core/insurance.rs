use super::tables::InsuranceFactors;
use super::types::{InsuranceInputs, InsuranceRecommendation};
use crate::error::{EngineResult, require_non_negative, require_positive};

pub fn estimate_insurance(
    inputs: &InsuranceInputs,
    factors: &InsuranceFactors,
) -> EngineResult<InsuranceRecommendation> {
    require_positive("annual_income", inputs.annual_income)?;
    require_non_negative("existing_coverage", inputs.existing_coverage)?;

    let life_cover = inputs.annual_income * factors.life_cover_multiple;
    let health_floor =
        factors.base_health_cover + inputs.dependents as f64 * factors.health_cover_per_dependent;
    let health_cover = health_floor.max(inputs.annual_income * factors.health_cover_income_share);
    let estimated_premium =
        life_cover * factors.life_premium_rate + health_cover * factors.health_premium_rate;

    Ok(InsuranceRecommendation {
        recommended_life_cover: life_cover,
        recommended_health_cover: health_cover,
        estimated_premium,
        coverage_gap: (life_cover - inputs.existing_coverage).max(0.0),
        recommendations: [
            "Buy term life insurance early for lower premiums",
            "Choose health insurance with family floater option",
            "Consider critical illness and disability coverage",
            "Review insurance needs every 3-5 years",
        ]
        .map(String::from)
        .to_vec(),
    })
}
