pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod views;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod context;
    pub mod session;
    pub mod snippet;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod session;
    pub mod snippet;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod chat;
    pub mod session;
}

pub mod handlers {
    pub mod chat;
    pub mod common;
    pub mod snippets;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
    pub mod session;
}

pub mod validation {
    pub mod forms;
    pub mod validator;
}
