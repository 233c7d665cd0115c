pub mod constants;
pub mod error;
pub mod types;
pub mod transaction;
pub mod event;
pub mod collection;
pub mod staking;

pub use constants::*;
pub use error::NuggetError;
pub use types::*;
pub use transaction::*;
pub use event::*;
pub use collection::*;
pub use staking::*;
