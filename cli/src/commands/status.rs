use anyhow::Result;
use std::process;

use crate::client::ApiClient;

use super::helpers::json_error;

/// Connection test against the configured server, no login required.
pub(crate) async fn cmd_status(client: &ApiClient, api_url: &str, json: bool) -> Result<()> {
    match client.ping().await {
        Ok(()) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "server": api_url, "reachable": true })
                );
            } else {
                println!("Server {api_url} is reachable.");
            }
            Ok(())
        }
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                process::exit(1);
            }
            Err(e)
        }
    }
}
