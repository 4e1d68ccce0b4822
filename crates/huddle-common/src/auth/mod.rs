//! Identity-provider token verification

mod jwt;

pub use jwt::{IdentityClaims, JwtService};
