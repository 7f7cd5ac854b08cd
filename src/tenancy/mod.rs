//! Tenant identity: host parsing, slug rules, and slug → tenant resolution.
//!
//! Every request is mapped to a [`TenantContext`] exactly once, at the top of
//! the pipeline, and downstream handlers read it from request extensions.

mod context;
mod host;
mod resolver;
mod slug;

pub use context::{TenantContext, TENANT_HEADER};
pub use host::{parse_host, HostTarget};
pub use resolver::{ResolutionError, TenantResolver};
pub use slug::{validate_slug, SlugError};
