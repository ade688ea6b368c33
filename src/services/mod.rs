pub mod attendance;
pub mod calendar;
pub mod enrollments;
pub mod profiles;
pub mod results;
pub mod roles;
