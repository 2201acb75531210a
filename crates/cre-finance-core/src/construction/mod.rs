pub mod interest_reserve;
