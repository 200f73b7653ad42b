pub mod logging;
pub mod pipeline;
pub mod router;
pub mod types;
