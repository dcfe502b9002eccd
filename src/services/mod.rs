pub mod gemini;
pub mod generation;
pub mod image_data;
pub mod job_store;
pub mod queue;
