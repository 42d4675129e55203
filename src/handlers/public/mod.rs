// Public handlers: no token required

pub mod system;

pub use system::{health, root};
