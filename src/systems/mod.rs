mod commute;
mod economy;
mod income;

pub use commute::CommuteSystem;
pub use economy::EconomySystem;
pub use income::IncomeSystem;
