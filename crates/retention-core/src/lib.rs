#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod integrity;
pub mod load;
pub mod model;
pub mod schema;
pub mod set;
pub mod traits;

pub use model::{Deployment, Environment, Project, Release, RetentionInputs};
pub use set::ReleaseSet;
pub use traits::{KeptReleaseEvent, RetentionObserver, RetentionStrategy};
