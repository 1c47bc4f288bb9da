pub mod health;
pub mod mentorships;
pub mod metrics;
pub mod swagger;
