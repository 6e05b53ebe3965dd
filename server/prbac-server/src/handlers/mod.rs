pub mod access;
pub mod groups;
pub mod health;
pub mod placeholders;
pub mod roles;
