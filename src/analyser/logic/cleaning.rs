use super::types::{
    BUDGET_FIELD, REVENUE_FIELD, SUCCESS_IMPACT_FIELD, numeric_values, require_field,
};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Keeps rows whose `field` is strictly greater than `threshold`.
///
/// Rows where the field is null are dropped. Surviving rows are untouched.
///
/// # Errors
///
/// [`PipelineError::MissingField`] when `field` is absent.
pub fn filter_greater_than(df: &DataFrame, field: &str, threshold: f64) -> Result<DataFrame> {
    require_field(df, field)?;
    Ok(df
        .clone()
        .lazy()
        .filter(col(field).cast(DataType::Float64).gt(lit(threshold)))
        .collect()?)
}

/// A new field computed from existing ones.
///
/// `divisors` lists the fields the expression divides by; each must be
/// non-zero on every row before the expression is evaluated.
#[derive(Debug, Clone)]
pub struct Derivation {
    pub name: String,
    pub expr: Expr,
    pub divisors: Vec<String>,
    pub inputs: Vec<String>,
}

impl Derivation {
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
            divisors: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs<S: Into<String>>(mut self, inputs: impl IntoIterator<Item = S>) -> Self {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_divisor(mut self, field: impl Into<String>) -> Self {
        self.divisors.push(field.into());
        self
    }

    /// `(revenue - budget) / budget`
    pub fn success_impact() -> Self {
        let revenue = col(REVENUE_FIELD).cast(DataType::Float64);
        let budget = col(BUDGET_FIELD).cast(DataType::Float64);
        Self::new(SUCCESS_IMPACT_FIELD, (revenue - budget.clone()) / budget)
            .with_inputs([REVENUE_FIELD, BUDGET_FIELD])
            .with_divisor(BUDGET_FIELD)
    }
}

/// Evaluates `derivation` for every row and stores it as a new `Float64` field.
///
/// # Errors
///
/// [`PipelineError::MissingField`] when an input or divisor is absent, and
/// [`PipelineError::DivisionByZero`] naming the first row whose divisor is 0.
pub fn derive(df: &DataFrame, derivation: &Derivation) -> Result<DataFrame> {
    for input in &derivation.inputs {
        require_field(df, input)?;
    }
    for divisor in &derivation.divisors {
        let zero_row = numeric_values(df, divisor)?
            .into_iter()
            .position(|v| v == Some(0.0));
        if let Some(row) = zero_row {
            return Err(PipelineError::DivisionByZero {
                field: divisor.clone(),
                row,
            });
        }
    }

    Ok(df
        .clone()
        .lazy()
        .with_column(
            derivation
                .expr
                .clone()
                .cast(DataType::Float64)
                .alias(derivation.name.as_str()),
        )
        .collect()?)
}

/// Min-max rescales `field` in place into `[0, upper]` using its own min and max.
///
/// Nulls stay null. Rescaling twice is not the same as rescaling once unless
/// the column already spans exactly `[0, upper]`.
///
/// # Errors
///
/// [`PipelineError::DegenerateRange`] when the column has no spread (or no
/// values at all).
pub fn rescale(df: &DataFrame, field: &str, upper: f64) -> Result<DataFrame> {
    let values = require_field(df, field)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = values.f64()?;

    let (min, max) = match (ca.min(), ca.max()) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return Err(PipelineError::DegenerateRange {
                field: field.to_owned(),
                value: f64::NAN,
            });
        }
    };
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return Err(PipelineError::DegenerateRange {
            field: field.to_owned(),
            value: min,
        });
    }

    let expr = col(field).cast(DataType::Float64);
    Ok(df
        .clone()
        .lazy()
        .with_column((lit(upper) * (expr - lit(min)) / lit(range)).alias(field))
        .collect()?)
}

/// Fixed-width integer targets for [`narrow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    I16,
    I32,
}

impl IntWidth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I16 => "i16",
            Self::I32 => "i32",
        }
    }

    fn bounds(self) -> (f64, f64) {
        match self {
            Self::I16 => (f64::from(i16::MIN), f64::from(i16::MAX)),
            Self::I32 => (f64::from(i32::MIN), f64::from(i32::MAX)),
        }
    }
}

/// Casts `field` to a narrower integer type, truncating toward zero.
///
/// Every value is range-checked first; nothing wraps. Nulls stay null.
///
/// # Errors
///
/// [`PipelineError::Overflow`] for the first value (or NaN/infinity) that
/// does not fit the target.
pub fn narrow(df: &DataFrame, field: &str, width: IntWidth) -> Result<DataFrame> {
    let values = numeric_values(df, field)?;
    let (lo, hi) = width.bounds();

    let mut truncated = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        let Some(v) = value else {
            truncated.push(None);
            continue;
        };
        let t = v.trunc();
        if !t.is_finite() || t < lo || t > hi {
            return Err(PipelineError::Overflow {
                field: field.to_owned(),
                row,
                value: v,
                target: width.as_str(),
            });
        }
        truncated.push(Some(t));
    }

    // Every value is already in range, so the cast is exact.
    let series = Series::new(field.into(), truncated);
    let series = match width {
        IntWidth::I16 => series.strict_cast(&DataType::Int16)?,
        IntWidth::I32 => series.strict_cast(&DataType::Int32)?,
    };

    let mut out = df.clone();
    out.with_column(series)?;
    Ok(out)
}
