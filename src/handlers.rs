pub mod auth;
pub mod members;
pub mod plans;
pub mod rbac;
pub mod tenancy;
