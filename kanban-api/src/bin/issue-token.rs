//! Development token issuer
//!
//! Prints a bearer token signed with `KANBAN_JWT_SECRET` for the given user
//! id, or for a fresh one when none is given.
//!
//! Usage:
//!   cargo run -p kanban-api --bin issue-token -- [USER_ID] [NAME]

use kanban_api::{generate_jwt_token, AuthConfig};
use kanban_core::UserId;

fn main() {
    let mut args = std::env::args().skip(1);

    let user_id = match args.next() {
        Some(raw) => match raw.parse::<UserId>() {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid user id '{}': {}", raw, e);
                std::process::exit(2);
            }
        },
        None => UserId::now_v7(),
    };
    let name = args.next();

    let config = AuthConfig::from_env();
    match generate_jwt_token(&config, user_id, name) {
        Ok(token) => {
            eprintln!("user_id: {}", user_id);
            println!("{}", token);
        }
        Err(e) => {
            eprintln!("Failed to issue token: {}", e);
            std::process::exit(1);
        }
    }
}
