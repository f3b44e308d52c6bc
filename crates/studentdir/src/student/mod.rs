//! Student directory module.

mod models;
mod repository;
mod service;

pub use models::{CreateStudentRequest, Student, UpdateStudentRequest};
pub use repository::StudentRepository;
pub use service::StudentService;
