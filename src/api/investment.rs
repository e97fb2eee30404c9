use axum::extract::{Json, State};
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, check_range, explained, required};
use crate::core::{
    InstrumentType, InsuranceInputs, InvestmentParameters, compute_growth, estimate_insurance,
};
use crate::explain_context;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct InvestmentPayload {
    investment_type: Option<InstrumentType>,
    monthly_amount: Option<f64>,
    annual_return_rate: Option<f64>,
    investment_period_years: Option<u32>,
    age: Option<u32>,
    inflation_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct InsurancePayload {
    age: Option<u32>,
    annual_income: Option<f64>,
    dependents: Option<u32>,
    existing_coverage: Option<f64>,
}

fn investment_params_from_payload(
    payload: InvestmentPayload,
    default_inflation_rate: f64,
) -> Result<InvestmentParameters, ApiError> {
    let annual_rate = required(payload.annual_return_rate, "annual_return_rate")?;
    if !annual_rate.is_finite() || annual_rate <= 0.0 || annual_rate > 50.0 {
        return Err(ApiError::BadRequest(
            "annual_return_rate must be > 0 and <= 50".to_string(),
        ));
    }
    let tenor_years = check_range(
        required(payload.investment_period_years, "investment_period_years")?,
        "investment_period_years",
        1,
        50,
    )?;
    let age = payload
        .age
        .map(|age| check_range(age, "age", 18, 100))
        .transpose()?;

    Ok(InvestmentParameters {
        instrument: required(payload.investment_type, "investment_type")?,
        monthly_contribution: required(payload.monthly_amount, "monthly_amount")?,
        annual_rate,
        tenor_years,
        age,
        inflation_rate: payload.inflation_rate.unwrap_or(default_inflation_rate),
    })
}

fn insurance_inputs_from_payload(payload: InsurancePayload) -> Result<InsuranceInputs, ApiError> {
    Ok(InsuranceInputs {
        age: check_range(required(payload.age, "age")?, "age", 18, 65)?,
        annual_income: required(payload.annual_income, "annual_income")?,
        dependents: required(payload.dependents, "dependents")?,
        existing_coverage: payload.existing_coverage.unwrap_or(0.0),
    })
}

pub(super) async fn simulate_handler(
    State(state): State<AppState>,
    Json(payload): Json<InvestmentPayload>,
) -> ApiResult {
    let params = investment_params_from_payload(payload, state.default_inflation_rate)?;
    let result = compute_growth(&params, &state.tables)?;
    tracing::info!(
        instrument = params.instrument.label(),
        years = params.tenor_years,
        final_corpus = result.final_corpus,
        "investment simulated"
    );

    let context = explain_context! {
        "investment_type" => params.instrument.label(),
        "monthly_amount" => params.monthly_contribution,
        "return_rate" => params.annual_rate,
        "period" => params.tenor_years,
        "final_corpus" => result.final_corpus,
        "total_returns" => result.total_returns,
    };
    let prompt = format!(
        "Explain this {} investment: ₹{:.0} monthly for {} years at {}% return. \
         Final corpus: ₹{:.0}, Returns: ₹{:.0}",
        params.instrument.label(),
        params.monthly_contribution,
        params.tenor_years,
        params.annual_rate,
        result.final_corpus,
        result.total_returns,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(result, ai_explanation))
}

pub(super) async fn insurance_handler(
    State(state): State<AppState>,
    Json(payload): Json<InsurancePayload>,
) -> ApiResult {
    let inputs = insurance_inputs_from_payload(payload)?;
    let result = estimate_insurance(&inputs, &state.tables.insurance)?;
    tracing::info!(
        dependents = inputs.dependents,
        coverage_gap = result.coverage_gap,
        "insurance needs estimated"
    );

    let context = explain_context! {
        "age" => inputs.age,
        "annual_income" => inputs.annual_income,
        "dependents" => inputs.dependents,
        "life_cover" => result.recommended_life_cover,
        "health_cover" => result.recommended_health_cover,
    };
    let prompt = format!(
        "Explain insurance needs for a {}-year-old earning ₹{:.0} annually with {} dependents. \
         Recommended life cover: ₹{:.0}, health cover: ₹{:.0}",
        inputs.age,
        inputs.annual_income,
        inputs.dependents,
        result.recommended_life_cover,
        result.recommended_health_cover,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(result, ai_explanation))
}
