use std::collections::BTreeSet;

use super::insurance::estimate_insurance;
use super::tables::EngineTables;
use super::types::{
    AllocationGuidance, FinancialGoal, FinancialProfile, GoalGuidance, InsuranceInputs,
    ProfileAssessment, RiskLevel,
};
use crate::error::{EngineResult, require_non_negative, require_positive};

/// Share of reported expenses assumed to be needs; the rest is wants.
const NEEDS_SHARE_OF_EXPENSES: f64 = 0.7;
const WANTS_SHARE_OF_EXPENSES: f64 = 0.3;
const NEEDS_SHARE_OF_INCOME: f64 = 0.55;
const WANTS_SHARE_OF_INCOME: f64 = 0.25;
const SAVINGS_SHARE_OF_INCOME: f64 = 0.20;
const EMERGENCY_FUND_MONTHS: f64 = 6.0;

const ACTION_PLAN: [&str; 5] = [
    "Create a monthly budget and track expenses",
    "Build emergency fund of 6 months expenses",
    "Start SIP in equity mutual funds",
    "Get adequate life and health insurance",
    "Review and optimize tax-saving investments",
];

pub fn assess_profile(
    profile: &FinancialProfile,
    tables: &EngineTables,
) -> EngineResult<ProfileAssessment> {
    require_positive("monthly_income", profile.monthly_income)?;
    require_positive("monthly_expenses", profile.monthly_expenses)?;
    require_non_negative("current_savings", profile.current_savings)?;
    require_non_negative("current_investments", profile.current_investments)?;

    let savings_rate =
        (profile.monthly_income - profile.monthly_expenses) / profile.monthly_income * 100.0;
    let emergency_fund_months = profile.current_savings / profile.monthly_expenses;
    let investment_ratio = profile.current_investments / (profile.monthly_income * 12.0);

    let score = savings_points(savings_rate)
        + emergency_points(emergency_fund_months)
        + investment_points(investment_ratio)
        + age_points(profile.age);

    let insurance = estimate_insurance(
        &InsuranceInputs {
            age: profile.age,
            annual_income: profile.monthly_income * 12.0,
            dependents: profile.dependents,
            existing_coverage: 0.0,
        },
        &tables.insurance,
    )?;

    let mut warnings = Vec::new();
    if savings_rate < 10.0 {
        warnings.push("Low savings rate! Try to reduce expenses or increase income.".to_string());
    }
    if emergency_fund_months < 3.0 {
        warnings.push("Build emergency fund of 6 months expenses before investing.".to_string());
    }
    if profile.current_investments == 0.0 && profile.age > 25 {
        warnings.push("Start investing immediately to benefit from compounding.".to_string());
    }

    Ok(ProfileAssessment {
        financial_health_score: score.min(100),
        savings_rate,
        emergency_fund_months,
        investment_ratio,
        budget_recommendations: allocation_guidance(profile),
        savings_suggestions: savings_suggestions(profile),
        investment_recommendations: investment_recommendations(profile.age, profile.risk_level),
        goal_guidance: goal_guidance(profile),
        insurance,
        warnings,
        action_plan: ACTION_PLAN.map(String::from).into(),
    })
}

fn savings_points(savings_rate: f64) -> u32 {
    if savings_rate >= 20.0 {
        30
    } else if savings_rate >= 10.0 {
        20
    } else if savings_rate > 0.0 {
        10
    } else {
        0
    }
}

fn emergency_points(months: f64) -> u32 {
    if months >= 6.0 {
        25
    } else if months >= 3.0 {
        15
    } else if months >= 1.0 {
        10
    } else {
        0
    }
}

fn investment_points(ratio: f64) -> u32 {
    if ratio >= 0.2 {
        25
    } else if ratio >= 0.1 {
        15
    } else if ratio > 0.0 {
        10
    } else {
        0
    }
}

fn age_points(age: u32) -> u32 {
    match age {
        0..=30 => 20,
        31..=45 => 15,
        _ => 10,
    }
}

fn allocation_guidance(profile: &FinancialProfile) -> Vec<AllocationGuidance> {
    let row = |category: &str, current: f64, recommended: f64, explanation: &str| {
        AllocationGuidance {
            category: category.to_string(),
            current_allocation: current,
            recommended_allocation: recommended,
            difference: recommended - current,
            explanation: explanation.to_string(),
        }
    };
    let income = profile.monthly_income;
    let expenses = profile.monthly_expenses;

    vec![
        row(
            "Essential Expenses (Rent, Food, Utilities)",
            expenses * NEEDS_SHARE_OF_EXPENSES,
            income * NEEDS_SHARE_OF_INCOME,
            "Keep essential expenses under 55% of income for better savings",
        ),
        row(
            "Discretionary Spending (Entertainment, Dining)",
            expenses * WANTS_SHARE_OF_EXPENSES,
            income * WANTS_SHARE_OF_INCOME,
            "Limit discretionary spending to 25% for better financial health",
        ),
        row(
            "Savings & Investments",
            income - expenses,
            income * SAVINGS_SHARE_OF_INCOME,
            "Aim to save at least 20% of your income",
        ),
    ]
}

fn savings_suggestions(profile: &FinancialProfile) -> Vec<String> {
    vec![
        format!(
            "Set up automatic transfer of ₹{:.0} to savings account",
            profile.monthly_income * SAVINGS_SHARE_OF_INCOME
        ),
        "Use the envelope method for expense tracking".to_string(),
        "Review and cancel unused subscriptions".to_string(),
        "Cook at home more often to reduce food expenses".to_string(),
    ]
}

/// Risk appetite only changes the mix for investors aged 30 or under.
fn investment_recommendations(age: u32, risk: RiskLevel) -> Vec<String> {
    let lines: [&str; 3] = match (age, risk) {
        (0..=30, RiskLevel::Aggressive) => [
            "Invest 70% in equity mutual funds (large-cap + mid-cap)",
            "Consider small-cap funds for higher growth",
            "Start SIP in ELSS funds for tax savings",
        ],
        (0..=30, RiskLevel::Conservative | RiskLevel::Moderate) => [
            "Start with large-cap equity funds",
            "Invest in balanced/hybrid funds",
            "Consider PPF for tax-free returns",
        ],
        (31..=45, _) => [
            "Balance between equity (60%) and debt (40%)",
            "Increase focus on retirement planning",
            "Consider NPS for additional tax benefits",
        ],
        _ => [
            "Shift to conservative investments (debt funds, FDs)",
            "Focus on capital preservation",
            "Ensure adequate health insurance coverage",
        ],
    };
    lines.map(String::from).into()
}

/// One line per distinct goal, in the order the goals were given.
fn goal_guidance(profile: &FinancialProfile) -> Vec<GoalGuidance> {
    let mut seen = BTreeSet::new();
    profile
        .financial_goals
        .iter()
        .filter(|goal| seen.insert(**goal))
        .map(|&goal| GoalGuidance {
            goal,
            suggestion: goal_suggestion(goal, profile),
        })
        .collect()
}

fn goal_suggestion(goal: FinancialGoal, profile: &FinancialProfile) -> String {
    match goal {
        FinancialGoal::EmergencyFund => {
            let target = profile.monthly_expenses * EMERGENCY_FUND_MONTHS;
            let shortfall = (target - profile.current_savings).max(0.0);
            format!(
                "Keep ₹{target:.0} (6 months of expenses) in a liquid fund or sweep-in FD;                  ₹{shortfall:.0} still to go"
            )
        }
        FinancialGoal::HomePurchase => {
            "Build the down payment in short-duration debt funds and keep the home-loan EMI              under 40% of take-home pay"
                .to_string()
        }
        FinancialGoal::Retirement => match profile.risk_level {
            RiskLevel::Conservative => {
                "Use PPF and NPS conservative-life-cycle funds for steady retirement savings"
                    .to_string()
            }
            RiskLevel::Moderate | RiskLevel::Aggressive => {
                "Contribute to NPS for the extra ₹50,000 80CCD(1B) deduction and run an                  equity SIP alongside it"
                    .to_string()
            }
        },
        FinancialGoal::ChildEducation => {
            "Start a dedicated SIP for education costs; consider Sukanya Samriddhi Yojana              for a daughter"
                .to_string()
        }
        FinancialGoal::WealthCreation => match profile.risk_level {
            RiskLevel::Aggressive => {
                "Step up equity SIPs by 10% every year and add mid/small-cap exposure"
                    .to_string()
            }
            RiskLevel::Conservative | RiskLevel::Moderate => {
                "Step up SIPs by 10% every year in large-cap and hybrid funds".to_string()
            }
        },
    }
}
