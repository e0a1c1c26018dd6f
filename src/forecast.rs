use crate::engine::DreReport;
use crate::utils::{month_label_after, round_to};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Below this many historical points the fit is not trusted and confidence is fixed.
pub const MIN_POINTS_FOR_R_SQUARED: usize = 3;
pub const LOW_HISTORY_CONFIDENCE: f64 = 0.5;
/// Annualized growth (percent) beyond which the trend is no longer stable.
pub const TREND_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares of `values[i]` against `i`.
pub fn linear_regression(values: &[f64]) -> LinearRegression {
    let n = values.len();
    if n < 2 {
        return LinearRegression {
            slope: 0.0,
            intercept: values.first().copied().unwrap_or(0.0),
        };
    }

    let n_f = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n_f * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return LinearRegression {
            slope: 0.0,
            intercept: sum_y / n_f,
        };
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n_f;
    LinearRegression { slope, intercept }
}

/// Coefficient of determination of `fit` over `values`, clamped to `[0, 1]`.
/// A constant series is perfectly explained and scores 1.
pub fn r_squared(values: &[f64], fit: &LinearRegression) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, y) in values.iter().enumerate() {
        ss_tot += (y - mean).powi(2);
        ss_res += (y - fit.predict(i as f64)).powi(2);
    }

    if ss_tot == 0.0 {
        return 1.0;
    }
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn from_growth_rate(growth_rate: f64) -> Self {
        if growth_rate > TREND_THRESHOLD {
            Trend::Up
        } else if growth_rate < -TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastPeriod {
    #[schemars(description = "Projected month, YYYY-MM")]
    pub periodo: String,
    pub receita_liquida: f64,
    pub ebitda: f64,
    pub lucro_liquido: f64,
    pub margem_ebitda: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastResult {
    pub periods: Vec<ForecastPeriod>,
    #[schemars(description = "Annualized net revenue growth, percent, one decimal")]
    pub growth_rate: f64,
    pub trend: Trend,
    #[schemars(description = "Fit quality of the revenue trend, in [0, 1]")]
    pub confidence: f64,
}

impl ForecastResult {
    pub fn empty() -> Self {
        Self {
            periods: Vec::new(),
            growth_rate: 0.0,
            trend: Trend::Stable,
            confidence: 0.0,
        }
    }
}

/// Projects `months_ahead` monthly periods from statements ordered oldest to newest.
pub fn forecast_dre(historical: &[DreReport], months_ahead: u32) -> ForecastResult {
    let Some(last) = historical.last() else {
        return ForecastResult::empty();
    };

    let revenue: Vec<f64> = historical.iter().map(|r| r.receita_liquida).collect();
    let ebitda: Vec<f64> = historical.iter().map(|r| r.ebitda).collect();
    let net_profit: Vec<f64> = historical.iter().map(|r| r.lucro_liquido).collect();

    let revenue_fit = linear_regression(&revenue);
    let ebitda_fit = linear_regression(&ebitda);
    let net_profit_fit = linear_regression(&net_profit);

    let n = historical.len();
    let periods = (1..=months_ahead)
        .map(|i| {
            let x = (n - 1) as f64 + i as f64;
            let receita_liquida = revenue_fit.predict(x).max(0.0);
            let projected_ebitda = ebitda_fit.predict(x);
            let lucro_liquido = net_profit_fit.predict(x);
            let margem_ebitda = if receita_liquida > 0.0 {
                projected_ebitda / receita_liquida * 100.0
            } else {
                0.0
            };

            ForecastPeriod {
                periodo: month_label_after(last.period.end_date, i),
                receita_liquida: round_to(receita_liquida, 2),
                ebitda: round_to(projected_ebitda, 2),
                lucro_liquido: round_to(lucro_liquido, 2),
                margem_ebitda: round_to(margem_ebitda, 2),
            }
        })
        .collect();

    let growth_rate = annualized_growth_rate(&revenue);
    let confidence = if n < MIN_POINTS_FOR_R_SQUARED {
        LOW_HISTORY_CONFIDENCE
    } else {
        r_squared(&revenue, &revenue_fit)
    };

    debug!(
        "Forecast from {} periods: growth {}%, confidence {:.3}",
        n, growth_rate, confidence
    );

    ForecastResult {
        periods,
        growth_rate,
        trend: Trend::from_growth_rate(growth_rate),
        confidence,
    }
}

/// Compound growth between the first and last revenue, annualized over the series length.
pub fn annualized_growth_rate(revenue: &[f64]) -> f64 {
    let n = revenue.len();
    if n < 2 {
        return 0.0;
    }

    let first = or_one(revenue[0]);
    let last = or_one(revenue[n - 1]);
    let rate = ((last / first).powf(12.0 / n as f64) - 1.0) * 100.0;

    // Sign flips between first and last leave no real root.
    if !rate.is_finite() {
        return 0.0;
    }
    round_to(rate, 1)
}

fn or_one(value: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        1.0
    } else {
        value
    }
}
