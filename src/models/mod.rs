pub mod answer;
pub mod employee_profile;
pub mod employee_result;
pub mod question;
pub mod technology;
pub mod test_attempt;
pub mod test_schedule;
pub mod user;
