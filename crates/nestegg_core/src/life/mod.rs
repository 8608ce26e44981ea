//! Life events that move money every month: work, benefits, medical care
//! and children.

mod children;
mod health;
mod job;
mod social_security;

pub use children::Child;
pub use health::{AssistedLiving, HealthCare};
pub use job::{Job, UNEMPLOYMENT_BENEFIT};
pub use social_security::{EARLY_AGE, SocialSecurity};
