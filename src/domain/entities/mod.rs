pub mod category;
pub mod contact_me;
pub mod skill;
pub mod token;
pub mod user;
