pub mod amortization;
pub mod blended_rate;
pub mod ratios;
pub mod refinance;
pub mod sizing;
