mod admin;
mod mobile;
mod web;

use serde::Deserialize;

/// Request body shared by both registration endpoints
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Request body shared by both login endpoints
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
    pub username: String,
}

pub use admin::health;
pub use mobile::{
    mobile_login, mobile_logout, mobile_me, mobile_refresh, mobile_register,
};
pub use web::{login, logout, me, register, update_profile};
