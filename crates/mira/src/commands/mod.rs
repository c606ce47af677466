//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod request;

pub(crate) use render::RenderArgs;
pub(crate) use request::RequestArgs;
