use std::collections::BTreeMap;

use super::types::{BudgetOptimization, OptimizationStep};
use crate::error::{EngineError, EngineResult, require_positive};

/// One line of the reduction plan. A cut takes at most `category_share` of the
/// category and at most `need_share` of the reduction still outstanding.
struct CutRule {
    category: &'static str,
    keys: &'static [&'static str],
    category_share: f64,
    need_share: f64,
    difficulty: &'static str,
    tips: [&'static str; 3],
}

/// Applied in order; earlier rules absorb as much of the gap as they can.
const CUT_RULES: [CutRule; 3] = [
    CutRule {
        category: "Discretionary Spending",
        keys: &["entertainment", "dining"],
        category_share: 0.5,
        need_share: 0.6,
        difficulty: "Easy",
        tips: [
            "Cook at home more often instead of dining out",
            "Find free entertainment alternatives",
            "Use streaming services instead of movie theaters",
        ],
    },
    CutRule {
        category: "Transportation",
        keys: &["transportation"],
        category_share: 0.3,
        need_share: 0.4,
        difficulty: "Medium",
        tips: [
            "Use public transportation or carpooling",
            "Work from home when possible",
            "Combine errands into single trips",
        ],
    },
    CutRule {
        category: "Utilities",
        keys: &["utilities"],
        category_share: 0.2,
        need_share: 1.0,
        difficulty: "Easy",
        tips: [
            "Switch to energy-efficient appliances",
            "Negotiate better rates with service providers",
            "Reduce unnecessary usage",
        ],
    },
];

/// Plans spending cuts that move `budget` toward `target_savings_rate`
/// percent of `monthly_income`.
pub fn optimize_budget(
    monthly_income: f64,
    budget: &BTreeMap<String, f64>,
    target_savings_rate: f64,
) -> EngineResult<BudgetOptimization> {
    require_positive("monthly_income", monthly_income)?;
    if budget.values().any(|amount| !amount.is_finite() || *amount < 0.0) {
        return Err(EngineError::invalid("current_budget", "amounts must be >= 0"));
    }
    if !target_savings_rate.is_finite() || !(0.0..100.0).contains(&target_savings_rate) {
        return Err(EngineError::invalid(
            "target_savings_rate",
            "must be >= 0 and < 100",
        ));
    }

    let current_expenses: f64 = budget.values().sum();
    let target_expenses = monthly_income * (1.0 - target_savings_rate / 100.0);
    let reduction_needed = (current_expenses - target_expenses).max(0.0);

    let mut outstanding = reduction_needed;
    let mut steps = Vec::new();
    for rule in &CUT_RULES {
        if outstanding <= 0.0 {
            break;
        }
        let current: f64 = rule.keys.iter().filter_map(|key| budget.get(*key)).sum();
        if current <= 0.0 {
            continue;
        }
        let savings = (current * rule.category_share).min(outstanding * rule.need_share);
        outstanding -= savings;
        steps.push(OptimizationStep {
            category: rule.category,
            current,
            suggested: current - savings,
            savings,
            difficulty: rule.difficulty,
            tips: rule.tips.map(String::from).into(),
        });
    }

    let total_suggested_savings: f64 = steps.iter().map(|step| step.savings).sum();
    let projected_expenses = current_expenses - total_suggested_savings;

    Ok(BudgetOptimization {
        monthly_income,
        current_expenses,
        target_expenses,
        reduction_needed,
        target_savings_rate,
        optimization_suggestions: steps,
        total_suggested_savings,
        remaining_gap: (reduction_needed - total_suggested_savings).max(0.0),
        projected_savings_rate: (monthly_income - projected_expenses) * 100.0 / monthly_income,
    })
}
