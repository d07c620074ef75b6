pub mod categorize;
pub mod feedback;
pub mod handlers;
pub mod matcher;
pub mod pipeline;
pub mod scoring;
pub mod similarity;
pub mod store;
pub mod text;
pub mod vocabulary;
