//! CLTV projection over a customer aggregate.
//!
//! 1. Fit BG/NBD on (frequency, recency, tenure) in weeks.
//! 2. Fit Gamma-Gamma on (frequency, average order value).
//! 3. Predict purchases for each configured horizon, the conditional
//!    expected order value and the discounted lifetime value.
//! 4. Split customers into quartile tiers on lifetime value.

use crate::error::{CltvError, Result};
use crate::models::{
    BetaGeoFitter, BetaGeoModel, FitConfig, GammaGammaFitter, GammaGammaModel, LifetimeHorizon,
    PurchaseModel, SpendModel,
};
use crate::models::gamma_gamma::DEFAULT_WEEKS_PER_PERIOD;
use crate::optimize::NelderMeadConfig;
use crate::tier::{Tier, assign_tiers};
use custseg_data::columns::{FREQUENCY, MASTER_ID, MONETARY_AVG, RECENCY_WEEKS, TENURE_WEEKS};
use custseg_data::{f64_values, i64_values, str_values};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Column names used by [`CltvTable::to_frame`].
pub mod columns {
    /// Prefix of the per-horizon expected purchase columns
    pub const EXPECTED_PURCHASES_PREFIX: &str = "exp_purchases_";
    /// Probability the customer is still active
    pub const PROBABILITY_ALIVE: &str = "probability_alive";
    /// Conditional expected average order value
    pub const EXPECTED_AVERAGE_VALUE: &str = "exp_average_value";
    /// Discounted lifetime value
    pub const CLTV: &str = "cltv";
    /// Quartile tier
    pub const TIER: &str = "tier";

    /// Column holding expected purchases over `weeks`.
    pub fn expected_purchases(weeks: f64) -> String {
        format!("{EXPECTED_PURCHASES_PREFIX}{weeks}w")
    }
}

/// Configuration for the CLTV projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CltvConfig {
    /// Customers need strictly more orders than this (default: 1.0)
    pub min_orders: f64,
    /// L2 penalty for both model fits (default: 0.001)
    pub penalizer: f64,
    /// Horizons for expected purchase predictions in weeks (default: 12, 24)
    pub purchase_horizons_weeks: Vec<f64>,
    /// Lifetime value horizon in weeks (default: 6 x 4.345)
    pub horizon_weeks: f64,
    /// Weeks per discounting period (default: 4.345)
    pub weeks_per_period: f64,
    /// Discount rate per period (default: 0.01)
    pub discount_rate: f64,
    /// Optimizer settings for both fits
    pub optimizer: NelderMeadConfig,
}

impl Default for CltvConfig {
    fn default() -> Self {
        let horizon = LifetimeHorizon::default();
        Self {
            min_orders: 1.0,
            penalizer: 0.001,
            purchase_horizons_weeks: vec![12.0, 24.0],
            horizon_weeks: horizon.horizon_weeks,
            weeks_per_period: DEFAULT_WEEKS_PER_PERIOD,
            discount_rate: horizon.discount_rate,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl CltvConfig {
    /// Settings passed to both fitters.
    pub const fn fit_config(&self) -> FitConfig {
        FitConfig {
            penalizer: self.penalizer,
            optimizer: self.optimizer,
        }
    }

    /// Lifetime value discounting schedule.
    pub const fn lifetime_horizon(&self) -> LifetimeHorizon {
        LifetimeHorizon {
            horizon_weeks: self.horizon_weeks,
            weeks_per_period: self.weeks_per_period,
            discount_rate: self.discount_rate,
        }
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<()> {
        if !self.min_orders.is_finite() || self.min_orders < 0.0 {
            return Err(CltvError::InvalidParameter(format!(
                "min_orders must be finite and non-negative, got {}",
                self.min_orders
            )));
        }
        if !self.penalizer.is_finite() || self.penalizer < 0.0 {
            return Err(CltvError::InvalidParameter(format!(
                "penalizer must be finite and non-negative, got {}",
                self.penalizer
            )));
        }
        if let Some(h) = self
            .purchase_horizons_weeks
            .iter()
            .find(|h| !h.is_finite() || **h <= 0.0)
        {
            return Err(CltvError::InvalidParameter(format!(
                "purchase horizons must be positive, got {h}"
            )));
        }
        if self.optimizer.max_iterations == 0 || !(self.optimizer.tolerance > 0.0) {
            return Err(CltvError::InvalidParameter(
                "optimizer needs max_iterations > 0 and tolerance > 0".to_string(),
            ));
        }
        self.lifetime_horizon().validate()
    }
}

/// Model inputs of the eligible customers, in customer-id order.
#[derive(Debug, Clone)]
pub struct CltvDataset {
    customer_ids: Vec<String>,
    frequency: Array1<f64>,
    recency: Array1<f64>,
    tenure: Array1<f64>,
    monetary_avg: Array1<f64>,
}

impl CltvDataset {
    /// Read the columns produced by the CLTV aggregator.
    ///
    /// `min_orders` only labels the error for an empty frame.
    pub fn from_frame(df: &DataFrame, min_orders: f64) -> Result<Self> {
        if df.height() == 0 {
            return Err(CltvError::NoEligibleCustomers { min_orders });
        }

        let df = df.sort([MASTER_ID], SortMultipleOptions::default())?;
        let customer_ids = str_values(&df, MASTER_ID)?;
        let frequency = f64_values(&df, FREQUENCY)?;
        let recency = f64_values(&df, RECENCY_WEEKS)?;
        let tenure = f64_values(&df, TENURE_WEEKS)?;
        let monetary_avg = f64_values(&df, MONETARY_AVG)?;

        for (i, id) in customer_ids.iter().enumerate() {
            let fields = [
                ("frequency", frequency[i]),
                ("recency", recency[i]),
                ("tenure", tenure[i]),
                ("monetary_avg", monetary_avg[i]),
            ];
            if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(CltvError::NonFinite {
                    customer_id: id.clone(),
                    field,
                });
            }
            if monetary_avg[i] <= 0.0 {
                return Err(CltvError::NonPositiveMonetary {
                    customer_id: id.clone(),
                    value: monetary_avg[i],
                });
            }
        }

        Ok(Self {
            customer_ids,
            frequency: Array1::from(frequency),
            recency: Array1::from(recency),
            tenure: Array1::from(tenure),
            monetary_avg: Array1::from(monetary_avg),
        })
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.customer_ids.len()
    }

    /// Whether there are no customers.
    pub fn is_empty(&self) -> bool {
        self.customer_ids.is_empty()
    }

    /// Customer identifiers.
    pub fn customer_ids(&self) -> &[String] {
        &self.customer_ids
    }
}

/// Lifetime value projection of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CltvRecord {
    /// Customer identifier
    pub customer_id: String,
    /// Order count
    pub frequency: i64,
    /// Weeks between first and last order
    pub recency_weeks: f64,
    /// Weeks between first order and the anchor date
    pub tenure_weeks: f64,
    /// Average order value
    pub monetary_avg: f64,
    /// Expected purchases per configured horizon, same order as
    /// [`CltvTable::horizons_weeks`]
    pub expected_purchases: Vec<f64>,
    /// Probability the customer is still active
    pub probability_alive: f64,
    /// Conditional expected order value
    pub expected_average_value: f64,
    /// Discounted lifetime value
    pub cltv: f64,
    /// Quartile tier of `cltv`
    pub tier: Tier,
}

/// Summary statistics of lifetime value within one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    /// Tier
    pub tier: Tier,
    /// Number of customers
    pub customers: usize,
    /// Mean CLTV
    pub mean: f64,
    /// Sample standard deviation of CLTV (None for a single customer)
    pub std: Option<f64>,
    /// Smallest CLTV
    pub min: f64,
    /// Largest CLTV
    pub max: f64,
}

/// Projected customers in customer-id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CltvTable {
    horizons_weeks: Vec<f64>,
    records: Vec<CltvRecord>,
    purchase_model: BetaGeoModel,
    spend_model: GammaGammaModel,
}

impl CltvTable {
    /// Assemble a table from projected records and the models behind them.
    pub const fn new(
        horizons_weeks: Vec<f64>,
        records: Vec<CltvRecord>,
        purchase_model: BetaGeoModel,
        spend_model: GammaGammaModel,
    ) -> Self {
        Self {
            horizons_weeks,
            records,
            purchase_model,
            spend_model,
        }
    }

    /// Prediction horizons in weeks.
    pub fn horizons_weeks(&self) -> &[f64] {
        &self.horizons_weeks
    }

    /// All records.
    pub fn records(&self) -> &[CltvRecord] {
        &self.records
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records.
    pub fn iter(&self) -> impl Iterator<Item = &CltvRecord> {
        self.records.iter()
    }

    /// Record of one customer.
    pub fn get(&self, customer_id: &str) -> Option<&CltvRecord> {
        self.records
            .binary_search_by(|r| r.customer_id.as_str().cmp(customer_id))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Fitted purchase model.
    pub const fn purchase_model(&self) -> &BetaGeoModel {
        &self.purchase_model
    }

    /// Fitted spend model.
    pub const fn spend_model(&self) -> &GammaGammaModel {
        &self.spend_model
    }

    /// Table as a polars frame, one expected purchase column per horizon.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns_out: Vec<Column> = vec![
            Series::new(
                MASTER_ID.into(),
                self.records.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                FREQUENCY.into(),
                self.records.iter().map(|r| r.frequency).collect::<Vec<_>>(),
            )
            .into(),
            self.float_column(RECENCY_WEEKS, |r| r.recency_weeks),
            self.float_column(TENURE_WEEKS, |r| r.tenure_weeks),
            self.float_column(MONETARY_AVG, |r| r.monetary_avg),
        ];

        for (i, &weeks) in self.horizons_weeks.iter().enumerate() {
            let values = self
                .records
                .iter()
                .map(|r| {
                    r.expected_purchases.get(i).copied().ok_or(CltvError::DimensionMismatch {
                        expected: self.horizons_weeks.len(),
                        actual: r.expected_purchases.len(),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            columns_out.push(Series::new(columns::expected_purchases(weeks).into(), values).into());
        }

        columns_out.push(self.float_column(columns::PROBABILITY_ALIVE, |r| r.probability_alive));
        columns_out.push(self.float_column(columns::EXPECTED_AVERAGE_VALUE, |r| r.expected_average_value));
        columns_out.push(self.float_column(columns::CLTV, |r| r.cltv));
        columns_out.push(
            Series::new(
                columns::TIER.into(),
                self.records.iter().map(|r| r.tier.as_str()).collect::<Vec<_>>(),
            )
            .into(),
        );

        Ok(DataFrame::new(columns_out)?)
    }

    fn float_column(&self, name: &str, value: fn(&CltvRecord) -> f64) -> Column {
        Series::new(name.into(), self.records.iter().map(value).collect::<Vec<f64>>()).into()
    }

    /// CLTV statistics per tier, lowest tier first.
    pub fn tier_summary(&self) -> Result<Vec<TierSummary>> {
        let summary = self
            .to_frame()?
            .lazy()
            .group_by([col(columns::TIER)])
            .agg([
                len().alias("customers"),
                col(columns::CLTV).mean().alias("mean"),
                col(columns::CLTV).std(1).alias("std"),
                col(columns::CLTV).min().alias("min"),
                col(columns::CLTV).max().alias("max"),
            ])
            .collect()?;

        let labels = str_values(&summary, columns::TIER)?;
        let customers = i64_values(&summary, "customers")?;
        let mean = f64_values(&summary, "mean")?;
        let min = f64_values(&summary, "min")?;
        let max = f64_values(&summary, "max")?;
        let std: Vec<Option<f64>> = summary
            .column("std")?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .collect();

        let mut rows: Vec<TierSummary> = Tier::ALL
            .iter()
            .filter_map(|&tier| {
                let i = labels.iter().position(|l| l == tier.as_str())?;
                Some(TierSummary {
                    tier,
                    customers: usize::try_from(customers[i]).unwrap_or_default(),
                    mean: mean[i],
                    std: std[i].filter(|s| s.is_finite()),
                    min: min[i],
                    max: max[i],
                })
            })
            .collect();
        rows.sort_by_key(|row| row.tier);

        Ok(rows)
    }
}

impl<'a> IntoIterator for &'a CltvTable {
    type Item = &'a CltvRecord;
    type IntoIter = std::slice::Iter<'a, CltvRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Fits the purchase and spend models and projects lifetime value.
#[derive(Debug, Clone, Default)]
pub struct CltvProjector {
    config: CltvConfig,
}

impl CltvProjector {
    /// Create a projector.
    pub const fn new(config: CltvConfig) -> Self {
        Self { config }
    }

    /// Projection configuration.
    pub const fn config(&self) -> &CltvConfig {
        &self.config
    }

    /// Project lifetime value for the customers of a CLTV aggregate.
    pub fn project(&self, aggregate: &DataFrame) -> Result<CltvTable> {
        self.config.validate()?;
        let dataset = CltvDataset::from_frame(aggregate, self.config.min_orders)?;
        self.project_dataset(&dataset)
    }

    /// Fit both models on a dataset.
    pub fn fit(&self, dataset: &CltvDataset) -> Result<(BetaGeoModel, GammaGammaModel)> {
        let fit_config = self.config.fit_config();

        let purchases = BetaGeoFitter::new(fit_config).fit(
            &dataset.frequency,
            &dataset.recency,
            &dataset.tenure,
        )?;
        let spend =
            GammaGammaFitter::new(fit_config).fit(&dataset.frequency, &dataset.monetary_avg)?;

        Ok((purchases, spend))
    }

    /// Project lifetime value for an already validated dataset.
    pub fn project_dataset(&self, dataset: &CltvDataset) -> Result<CltvTable> {
        info!(customers = dataset.len(), "fitting CLTV models");
        let (purchases, spend) = self.fit(dataset)?;
        let horizon = self.config.lifetime_horizon();
        let horizons = self.config.purchase_horizons_weeks.clone();

        let mut records = Vec::with_capacity(dataset.len());
        for (i, customer_id) in dataset.customer_ids.iter().enumerate() {
            let x = dataset.frequency[i];
            let t_x = dataset.recency[i];
            let t = dataset.tenure[i];
            let m = dataset.monetary_avg[i];

            let expected_purchases: Vec<f64> = horizons
                .iter()
                .map(|&h| purchases.expected_purchases(h, x, t_x, t))
                .collect();
            let probability_alive = purchases.probability_alive(x, t_x, t);
            let expected_average_value = spend.expected_average_value(x, m);
            let cltv = spend.customer_lifetime_value(&purchases, x, t_x, t, m, &horizon);

            let non_finite = expected_purchases
                .iter()
                .map(|&e| ("expected purchases", e))
                .chain([
                    ("probability alive", probability_alive),
                    ("expected average value", expected_average_value),
                    ("cltv", cltv),
                ])
                .find(|(_, v)| !v.is_finite());
            if let Some((field, _)) = non_finite {
                return Err(CltvError::NonFinite {
                    customer_id: customer_id.clone(),
                    field,
                });
            }

            records.push(CltvRecord {
                customer_id: customer_id.clone(),
                frequency: x as i64,
                recency_weeks: t_x,
                tenure_weeks: t,
                monetary_avg: m,
                expected_purchases,
                probability_alive,
                expected_average_value,
                cltv,
                tier: Tier::D,
            });
        }

        let values: Vec<f64> = records.iter().map(|r| r.cltv).collect();
        let tiers = assign_tiers(&values)?;
        for (record, tier) in records.iter_mut().zip(tiers) {
            record.tier = tier;
        }
        debug!(customers = records.len(), "assigned CLTV tiers");

        info!(customers = records.len(), "projected customer lifetime value");
        Ok(CltvTable::new(horizons, records, purchases, spend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cltv_config_defaults() {
        let config = CltvConfig::default();
        assert_eq!(config.min_orders, 1.0);
        assert_eq!(config.penalizer, 0.001);
        assert_eq!(config.purchase_horizons_weeks, vec![12.0, 24.0]);
        assert!((config.horizon_weeks - 26.07).abs() < 1e-9);
        assert_eq!(config.weeks_per_period, 4.345);
        assert_eq!(config.discount_rate, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = CltvConfig {
            purchase_horizons_weeks: vec![12.0, -1.0],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CltvError::InvalidParameter(_))));

        let config = CltvConfig {
            discount_rate: -2.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expected_purchases_column_name() {
        assert_eq!(columns::expected_purchases(12.0), "exp_purchases_12w");
        assert_eq!(columns::expected_purchases(4.5), "exp_purchases_4.5w");
    }

    #[test]
    fn test_empty_aggregate() {
        let df = df!(
            MASTER_ID => Vec::<String>::new(),
            FREQUENCY => Vec::<i64>::new(),
        )
        .unwrap();
        let result = CltvProjector::default().project(&df);
        assert!(matches!(result, Err(CltvError::NoEligibleCustomers { .. })));
    }

    #[test]
    fn test_non_positive_monetary_names_customer() {
        let df = df!(
            MASTER_ID => ["a", "b"],
            FREQUENCY => [2i64, 3],
            RECENCY_WEEKS => [3.0, 4.0],
            TENURE_WEEKS => [10.0, 12.0],
            MONETARY_AVG => [20.0, 0.0],
        )
        .unwrap();
        let result = CltvDataset::from_frame(&df, 1.0);
        assert!(matches!(
            result,
            Err(CltvError::NonPositiveMonetary { ref customer_id, .. }) if customer_id == "b"
        ));
    }

    #[test]
    fn test_non_finite_input() {
        let df = df!(
            MASTER_ID => ["a", "b"],
            FREQUENCY => [2i64, 3],
            RECENCY_WEEKS => [3.0, f64::NAN],
            TENURE_WEEKS => [10.0, 12.0],
            MONETARY_AVG => [20.0, 15.0],
        )
        .unwrap();
        let result = CltvDataset::from_frame(&df, 1.0);
        assert!(matches!(
            result,
            Err(CltvError::NonFinite { field: "recency", .. })
        ));
    }
}
