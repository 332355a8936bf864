mod service;

pub use service::{AuthError, AuthService, JwtLogin, SessionLogin, TokenPair};
