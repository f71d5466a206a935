//! Category discount applied by the order service at purchase time.
//!
//! The browser client works out whether the cart holds several books from the same category and
//! sends that along as [`DiscountInfo`]. The order service only trusts it as far as the rule
//! below: a discount needs a named category with at least [`MIN_CATEGORY_COUNT`] books.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_CATEGORY_COUNT: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    /// The client asked for less than nothing or more than the whole price off
    #[error("Invalid discount percentage: {0}")]
    PercentageOutOfRange(Decimal),

    #[error("Discount calculation overflowed")]
    Overflow,
}

fn default_percentage() -> Decimal {
    Decimal::from(15)
}

/// Discount hint sent with a purchase request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountInfo {
    #[serde(default)]
    pub has_discount: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_count: i64,
    #[serde(default = "default_percentage", with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
}

impl Default for DiscountInfo {
    fn default() -> Self {
        Self {
            has_discount: false,
            category: String::new(),
            category_count: 0,
            discount_percentage: default_percentage(),
        }
    }
}

impl DiscountInfo {
    pub fn qualifies(&self) -> bool {
        self.has_discount && !self.category.is_empty() && self.category_count >= MIN_CATEGORY_COUNT
    }
}

/// What a buyer pays for one copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
    pub applied: bool,
}

/// Work out the price of one copy, with amounts rounded to cents.
///
/// A qualifying hint must ask for between 0 and 100 percent off. Hints that do not qualify are
/// ignored whatever their percentage.
pub fn apply_category_discount(price: Decimal, info: Option<&DiscountInfo>) -> Result<PriceBreakdown, DiscountError> {
    let Some(info) = info.filter(|info| info.qualifies()) else {
        return Ok(PriceBreakdown {
            original_price: price,
            discount_amount: Decimal::ZERO,
            final_price: price,
            applied: false,
        });
    };

    let percentage = info.discount_percentage;
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(DiscountError::PercentageOutOfRange(percentage));
    }

    let discount_amount = price
        .checked_mul(percentage)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::Overflow)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let final_price = price.checked_sub(discount_amount).ok_or(DiscountError::Overflow)?;

    Ok(PriceBreakdown {
        original_price: price,
        discount_amount,
        final_price,
        applied: true,
    })
}
