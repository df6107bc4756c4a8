//! Consumer bindings and the dashboard wiring.
//!
//! Each widget is a `QueryBinding` tying one endpoint to the shared filter;
//! `Dashboard` assembles the full widget set of the fires dashboard.

pub mod binding;
pub mod widgets;

pub use binding::{FetchFn, QueryBinding, WidgetState};
pub use widgets::{endpoints, BoundsStatus, Dashboard};
