//! Column names used by the transaction and customer frames.

/// Customer identifier (primary key of every aggregate).
pub const MASTER_ID: &str = "master_id";

/// Lifetime online order count.
pub const ORDER_NUM_ONLINE: &str = "order_num_total_ever_online";
/// Lifetime offline order count.
pub const ORDER_NUM_OFFLINE: &str = "order_num_total_ever_offline";
/// Lifetime online spend.
pub const VALUE_ONLINE: &str = "customer_value_total_ever_online";
/// Lifetime offline spend.
pub const VALUE_OFFLINE: &str = "customer_value_total_ever_offline";

/// First order date as a day number.
pub const FIRST_ORDER_DAY: &str = "first_order_day";
/// Last order date as a day number.
pub const LAST_ORDER_DAY: &str = "last_order_day";

/// Online + offline order count.
pub const TOTAL_ORDER: &str = "total_order";
/// Online + offline spend.
pub const TOTAL_VALUE: &str = "total_value";

/// Days since last order (RFM).
pub const RECENCY: &str = "recency";
/// Order count (RFM and CLTV).
pub const FREQUENCY: &str = "frequency";
/// Total spend (RFM).
pub const MONETARY: &str = "monetary";

/// Weeks between first and last order (CLTV).
pub const RECENCY_WEEKS: &str = "recency_weeks";
/// Weeks between first order and the anchor date (CLTV).
pub const TENURE_WEEKS: &str = "tenure_weeks";
/// Average spend per order (CLTV).
pub const MONETARY_AVG: &str = "monetary_avg";

/// Raw columns capped before the CLTV totals are derived.
pub const CAPPED_COLUMNS: [&str; 4] = [
    ORDER_NUM_ONLINE,
    ORDER_NUM_OFFLINE,
    VALUE_ONLINE,
    VALUE_OFFLINE,
];
