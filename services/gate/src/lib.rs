//! tg-gate：用户名/密码换取签名 access token，并以 token 保护资源路由。

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod handler;
pub mod logging;
pub mod router;
pub mod state;
