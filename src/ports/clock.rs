//! Clock Port - today's date for prompts and "appointments today".

use chrono::NaiveDate;

pub trait Clock: Send + Sync {
    /// The clinic's current calendar date.
    fn today(&self) -> NaiveDate;
}
