pub mod auth;
pub mod contact;
pub mod extractors;
pub mod in_flight;
pub mod skill_catalog;
