// Two security tiers:
// Public (no auth) -> Protected (token verified by jwt_auth_middleware)
pub mod public;
pub mod protected;
