use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::Deserialize;

use sip_core::models::{
    ConsumptionRecord, NewConsumption, UpdateConsumption, UpdateProfile, UserProfile,
};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
pub struct LoginReply {
    pub token: String,
    pub user_id: i64,
    pub name: String,
    pub expires_at: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("could not build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Turns a non-success response into an error. 4xx responses carry a
    /// message from the server; anything else gets a generic one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.is_client_error() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map_or_else(|_| format!("request failed ({status})"), |b| b.error);
            if status == StatusCode::UNAUTHORIZED {
                bail!("{message} (try `sip login` again)");
            }
            bail!("{message}");
        }
        bail!("server error ({status}); try again later");
    }

    pub async fn ping(&self) -> Result<()> {
        let response = self
            .request(reqwest::Method::GET, "/api/ping")
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserProfile> {
        let response = self
            .request(reqwest::Method::POST, "/api/register")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply> {
        let response = self
            .request(reqwest::Method::POST, "/api/login")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn logout(&self) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "/api/logout")
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn list_consumption(&self) -> Result<Vec<ConsumptionRecord>> {
        let response = self
            .request(reqwest::Method::GET, "/api/consumption")
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn add_consumption(&self, new: &NewConsumption) -> Result<ConsumptionRecord> {
        let response = self
            .request(reqwest::Method::POST, "/api/consumption")
            .json(new)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update_consumption(
        &self,
        id: i64,
        update: &UpdateConsumption,
    ) -> Result<ConsumptionRecord> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/api/consumption/{id}"))
            .json(update)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_consumption(&self, id: i64) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/api/consumption/{id}"))
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn get_profile(&self) -> Result<UserProfile> {
        let response = self
            .request(reqwest::Method::GET, "/api/profile")
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update_profile(&self, update: &UpdateProfile) -> Result<UserProfile> {
        let response = self
            .request(reqwest::Method::PUT, "/api/profile")
            .json(update)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        Ok(Self::check(response).await?.json().await?)
    }
}
