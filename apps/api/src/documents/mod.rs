pub mod job_descriptions;
pub mod pdf;
pub mod resumes;
