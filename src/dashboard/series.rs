//! Income and expense totals bucketed over the current week, month or year.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    dashboard::{
        range::{
            DateRange, month_abbrev, month_bounds, week_bounds, week_of_month, weekday_abbrev,
            year_bounds,
        },
        summary::finite_total,
    },
    transaction::TransactionType,
};

/// The span of time a series covers, ending with the period that contains today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// The current Monday to Sunday week, one bucket per day.
    Week,
    /// The current calendar month, one bucket per week.
    Month,
    /// The current calendar year, one bucket per month.
    Year,
}

impl Granularity {
    fn range(self, today: Date) -> DateRange {
        match self {
            Granularity::Week => week_bounds(today),
            Granularity::Month => month_bounds(today),
            Granularity::Year => year_bounds(today),
        }
    }

    /// The sort key of the bucket `date` falls in.
    fn bucket_key(self, date: Date, range: DateRange) -> i64 {
        match self {
            Granularity::Week => date.to_julian_day() as i64,
            Granularity::Month => week_of_month(date, range.start),
            Granularity::Year => u8::from(date.month()) as i64,
        }
    }

    fn bucket_name(self, date: Date, range: DateRange) -> String {
        match self {
            Granularity::Week => weekday_abbrev(date.weekday()).to_owned(),
            Granularity::Month => format!("Wk {}", week_of_month(date, range.start)),
            Granularity::Year => month_abbrev(date.month()).to_owned(),
        }
    }
}

/// The query parameters for the series endpoint.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    /// Which series to compute.
    pub period: Granularity,
}

/// The income and expense totals for one bucket of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// The label of the bucket, e.g. "Mon", "Wk 2" or "Mar".
    pub name: String,
    /// The sum of income in the bucket.
    pub income: f64,
    /// The sum of expenses in the bucket.
    pub expense: f64,
}

/// Bucket the transactions of `user_id` in the period containing `today`.
///
/// Buckets without any transactions are left out. A bucket that only holds
/// transfers is kept with zero income and expense.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a bucket total is too large to represent,
/// or [Error::SqlError] if there is some SQL error.
pub fn period_series(
    user_id: UserID,
    granularity: Granularity,
    today: Date,
    connection: &Connection,
) -> Result<Vec<PeriodBucket>, Error> {
    let range = granularity.range(today);

    let mut statement = connection.prepare(
        "SELECT date, type, amount FROM \"transaction\"
        WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
    )?;
    let rows = statement.query_map((user_id, range.start, range.end), |row| {
        Ok((
            row.get::<_, Date>(0)?,
            row.get::<_, TransactionType>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    let mut buckets: BTreeMap<i64, PeriodBucket> = BTreeMap::new();

    for row in rows {
        let (date, transaction_type, amount) = row?;
        let bucket = buckets
            .entry(granularity.bucket_key(date, range))
            .or_insert_with(|| PeriodBucket {
                name: granularity.bucket_name(date, range),
                income: 0.0,
                expense: 0.0,
            });

        match transaction_type {
            TransactionType::Income => bucket.income += amount,
            TransactionType::Expense => bucket.expense += amount,
            TransactionType::Transfer => {}
        }
    }

    buckets
        .into_values()
        .map(|bucket| -> Result<PeriodBucket, Error> {
            finite_total(bucket.income)?;
            finite_total(bucket.expense)?;
            Ok(bucket)
        })
        .collect()
}
