pub mod naming;
pub mod registry;
pub mod synthesize;

pub use naming::{derive_name, is_singular, segment_path};
pub use registry::CommandRegistry;
pub use synthesize::{check_eligibility, synthesize};
