pub mod user_repo;
pub use user_repo::UserRepository;
pub mod org_repo;
pub use org_repo::OrgRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
pub mod plan_repo;
pub use plan_repo::PlanRepository;
