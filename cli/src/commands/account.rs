use anyhow::Result;

use crate::client::ApiClient;
use crate::config::{self, SavedSession};

use super::helpers::{json_error, prompt_line};

pub(crate) async fn cmd_register(
    client: &ApiClient,
    name: &str,
    email: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password (min 8 characters)")?,
    };

    let profile = match client.register(name, email, &password).await {
        Ok(p) => p,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        let name = &profile.name;
        let goal = profile.daily_goal_liters;
        println!("Registered {name} (daily goal: {goal:.1} L)");
        println!("Run `sip login` to start logging drinks.");
    }
    Ok(())
}

pub(crate) async fn cmd_login(
    client: &ApiClient,
    email: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password")?,
    };

    let reply = match client.login(email, &password).await {
        Ok(r) => r,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    config::save_session(&SavedSession {
        token: reply.token,
        user_id: reply.user_id,
        name: reply.name.clone(),
        expires_at: reply.expires_at.clone(),
    })?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "logged_in": true,
                "name": reply.name,
                "expires_at": reply.expires_at,
            })
        );
    } else {
        let name = &reply.name;
        println!("Logged in as {name}.");
    }
    Ok(())
}

pub(crate) async fn cmd_logout(client: &ApiClient, json: bool) -> Result<()> {
    // Revoke server-side first; clear the local file even if that fails,
    // the token may already be expired or purged.
    if let Err(e) = client.logout().await {
        eprintln!("Warning: could not revoke session on server: {e:#}");
    }
    config::clear_session()?;

    if json {
        println!("{}", serde_json::json!({ "logged_in": false }));
    } else {
        println!("Logged out.");
    }
    Ok(())
}
