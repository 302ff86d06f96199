//! Per-row derived columns.

use crate::columns::{
    ORDER_NUM_OFFLINE, ORDER_NUM_ONLINE, TOTAL_ORDER, TOTAL_VALUE, VALUE_OFFLINE, VALUE_ONLINE,
};
use polars::prelude::*;

/// Add the channel-combined order count and spend.
///
/// ```text
/// total_order = order_num_total_ever_online + order_num_total_ever_offline
/// total_value = customer_value_total_ever_online + customer_value_total_ever_offline
/// ```
pub fn derive_features(data: LazyFrame) -> LazyFrame {
    data.with_columns([
        (col(ORDER_NUM_ONLINE) + col(ORDER_NUM_OFFLINE)).alias(TOTAL_ORDER),
        (col(VALUE_ONLINE) + col(VALUE_OFFLINE)).alias(TOTAL_VALUE),
    ])
}
