pub mod seeding;
pub mod validation;
