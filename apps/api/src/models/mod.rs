// Typed in-memory representation of everything that flows through the
// pipeline: inbound documents, the model request/response pair, and the
// structured results the Render Engine consumes.

pub mod job;
pub mod result;
pub mod resume;
pub mod task;
