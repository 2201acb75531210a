pub mod partner_split;
pub mod waterfall;
