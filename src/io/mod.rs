/// CSV export of the projected day.
pub mod export;
