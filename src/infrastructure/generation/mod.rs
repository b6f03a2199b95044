//! Generation infrastructure implementations

pub mod formatter;
pub mod template_renderer;

pub use formatter::{BuiltinFormatter, CommandFormatter, formatter_from_config};
pub use template_renderer::TemplateRenderer;
