//! Declarative desired-state vocabulary.
//!
//! Units describe what they want as a [`UnitTemplate`]: an ordered list of typed
//! [`Resource`]s whose properties may reference attributes of resources declared earlier
//! ([`Value`]). Nothing in this module performs I/O.

pub mod graph;
pub mod naming;
pub mod resource;
pub mod template;
pub mod value;

pub use graph::*;
pub use naming::*;
pub use resource::*;
pub use template::*;
pub use value::*;
