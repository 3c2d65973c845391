mod quote;
mod status;
mod ticker;

pub use quote::Quote;
pub use status::{GeoPoint, StatusPost};
pub use ticker::Ticker;
