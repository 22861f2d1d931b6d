//! Definition discovery and wiring runtime
//!
//! This crate walks a definitions root directory, loads each definition's
//! descriptor into the appropriate store, mounts its web surface onto the
//! host application, wires its routes and event handlers, and finally prunes
//! stored records whose backing directory is gone.

mod fsx;
mod host;
mod loader;
mod services;
mod wirer;

pub use fsx::path_exists;
pub use host::{HostApp, MountPlan, StaticMount, SubApp};
pub use loader::load_definition_metadata;
pub use services::{
    DefinitionEventRegistrar, EventHandlerSpec, NoopRouteSetup, NoopServiceSetup, RouteSetup,
    ServiceSetup,
};
pub use wirer::DefinitionWirer;
