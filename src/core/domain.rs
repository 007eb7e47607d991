use std::str::FromStr;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

// Clock is the only source of "today" for the lending services
pub trait Clock: Sync + Send {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        Self {
            now: today.and_hms_opt(10, 0, 0).unwrap_or_default(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

// upper bound of any loan period, fallback or configured
pub(crate) const MAX_LOAN_DAYS: i64 = 3650;

// Configuration abstracts config options for the lending system. The default_* values are
// the documented fallback policy used when no policy is configured for a member category.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    pub branch_id: String,
    pub default_loan_days: i64,
    pub default_max_loans: i64,
    pub default_fine_per_day: Decimal,
    pub due_soon_days: i64,
    pub page_size: usize,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            default_loan_days: 15,
            default_max_loans: 3,
            default_fine_per_day: dec!(50.00),
            due_soon_days: 2,
            page_size: 100,
        }
    }

    // values that do not parse or fall outside their range keep the default
    pub fn from_env(branch_id: &str) -> Self {
        let defaults = Configuration::new(branch_id);
        Configuration {
            branch_id: branch_id.to_string(),
            default_loan_days: env_or("LMS_DEFAULT_LOAN_DAYS", defaults.default_loan_days,
                                      |days| (1..=MAX_LOAN_DAYS).contains(days)),
            default_max_loans: env_or("LMS_DEFAULT_MAX_LOANS", defaults.default_max_loans, |max| *max >= 1),
            default_fine_per_day: env_or("LMS_DEFAULT_FINE_PER_DAY", defaults.default_fine_per_day,
                                         |fine| !fine.is_sign_negative()),
            due_soon_days: env_or("LMS_DUE_SOON_DAYS", defaults.due_soon_days, |days| *days >= 0),
            page_size: env_or("LMS_PAGE_SIZE", defaults.page_size, |size| *size >= 1),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T, accept: impl Fn(&T) -> bool) -> T {
    match std::env::var(name).ok().and_then(|val| val.trim().parse::<T>().ok()) {
        Some(val) if accept(&val) => val,
        Some(_) => {
            warn!(name, "ignoring out of range configuration value");
            default
        }
        None => default,
    }
}
