//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient), one per
//! simulated cloud service.
//!
//! Each wrapper implements [`ActorClient`](crate::framework::ActorClient) for the shared
//! `get` / `list` / `delete` and maps [`FrameworkError`](crate::framework::FrameworkError) into
//! its service's error enum. Entity errors travel boxed through the framework and are unboxed
//! back into the typed error here.

pub mod object_client;
pub mod parameter_client;
pub mod repository_client;

pub use object_client::*;
pub use parameter_client::*;
pub use repository_client::*;
