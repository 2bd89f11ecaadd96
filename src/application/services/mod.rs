//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner, etc.)
//! but are themselves concrete structs, not traits.

mod layout;
mod session;
mod tools;
mod upload;

pub use layout::LayoutService;
pub use session::SessionStore;
pub use tools::ToolService;
pub use upload::UploadService;
