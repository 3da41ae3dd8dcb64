pub mod controls;
pub mod detection;
pub mod forecast;
pub mod weather;

pub use controls::*;
pub use detection::*;
pub use forecast::*;
pub use weather::*;
