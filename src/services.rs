pub mod auth;
pub mod member_service;
pub mod plan_service;
pub mod rbac_service;
pub mod tenancy_service;
