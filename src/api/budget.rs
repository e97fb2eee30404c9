use std::collections::BTreeMap;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, check_range, explained, json_response, required};
use crate::core::{
    FinancialGoal, FinancialProfile, RiskLevel, analyze_budget, assess_profile, optimize_budget,
};
use crate::explain_context;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BudgetPayload {
    monthly_income: Option<f64>,
    expenses: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct OptimizePayload {
    monthly_income: Option<f64>,
    current_budget: BTreeMap<String, f64>,
    target_savings_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ProfilePayload {
    monthly_income: Option<f64>,
    monthly_expenses: Option<f64>,
    age: Option<u32>,
    current_savings: Option<f64>,
    current_investments: Option<f64>,
    dependents: Option<u32>,
    risk_level: Option<RiskLevel>,
    financial_goals: Vec<FinancialGoal>,
}

fn profile_from_payload(payload: ProfilePayload) -> Result<FinancialProfile, ApiError> {
    Ok(FinancialProfile {
        monthly_income: required(payload.monthly_income, "monthly_income")?,
        monthly_expenses: required(payload.monthly_expenses, "monthly_expenses")?,
        age: check_range(required(payload.age, "age")?, "age", 18, 100)?,
        current_savings: payload.current_savings.unwrap_or(0.0),
        current_investments: payload.current_investments.unwrap_or(0.0),
        dependents: payload.dependents.unwrap_or(0),
        risk_level: payload.risk_level.unwrap_or_default(),
        financial_goals: payload.financial_goals,
    })
}

pub(super) async fn analyze_handler(
    State(state): State<AppState>,
    Json(payload): Json<BudgetPayload>,
) -> ApiResult {
    let income = required(payload.monthly_income, "monthly_income")?;
    let analysis = analyze_budget(income, &payload.expenses, &state.tables.budget)?;
    tracing::info!(
        categories = analysis.categories.len(),
        overall_score = analysis.overall_score,
        "budget analyzed"
    );
    Ok(json_response(StatusCode::OK, analysis))
}

pub(super) async fn optimize_handler(Json(payload): Json<OptimizePayload>) -> ApiResult {
    let income = required(payload.monthly_income, "monthly_income")?;
    let target = required(payload.target_savings_rate, "target_savings_rate")?;
    let plan = optimize_budget(income, &payload.current_budget, target)?;
    tracing::info!(
        reduction_needed = plan.reduction_needed,
        suggested_savings = plan.total_suggested_savings,
        "budget optimization planned"
    );
    Ok(json_response(StatusCode::OK, plan))
}

pub(super) async fn coach_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProfilePayload>,
) -> ApiResult {
    let profile = profile_from_payload(payload)?;
    let assessment = assess_profile(&profile, &state.tables)?;
    tracing::info!(
        score = assessment.financial_health_score,
        warnings = assessment.warnings.len(),
        "financial profile assessed"
    );

    let context = explain_context! {
        "monthly_income" => profile.monthly_income,
        "monthly_expenses" => profile.monthly_expenses,
        "age" => profile.age,
        "risk_level" => profile.risk_level,
        "savings_rate" => assessment.savings_rate,
        "financial_health_score" => assessment.financial_health_score,
    };
    let prompt = format!(
        "Provide comprehensive financial advice for someone earning ₹{:.0}/month, \
         spending ₹{:.0}/month, age {}, with a savings rate of {:.1}% and a financial \
         health score of {}/100. Focus on practical steps for Indian context.",
        profile.monthly_income,
        profile.monthly_expenses,
        profile.age,
        assessment.savings_rate,
        assessment.financial_health_score,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(assessment, ai_explanation))
}
