pub mod device;
pub mod health;
pub mod notifications;
pub mod pages;

pub use device::*;
pub use health::*;
pub use notifications::*;
pub use pages::*;
