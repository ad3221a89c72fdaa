//! Project graph entities
//!
//! Targets and build configurations are fully modeled. Build phases, rules,
//! dependencies and file elements are modeled only as far as comment text
//! needs them.

mod build_configuration;
mod configuration_list;
mod elements;
mod target;

pub use build_configuration::*;
pub use configuration_list::*;
pub use elements::*;
pub use target::*;
