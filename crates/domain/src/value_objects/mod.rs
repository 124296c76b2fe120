pub mod sqrt_price;
pub mod tick_range;

pub use sqrt_price::SqrtPrice;
pub use tick_range::TickRange;
