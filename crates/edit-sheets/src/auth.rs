//! Token acquisition.
//!
//! Two credential kinds are supported:
//! - username/password through ClientLogin, yielding a `GoogleLogin` token
//!   scoped to one service;
//! - OAuth, either a ready access token or a refresh token exchanged at the
//!   token endpoint, yielding a `Bearer` token.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};
use crate::transport::{HttpRequest, HttpTransport};

pub const CLIENT_LOGIN_URL: &str = "https://www.google.com/accounts/ClientLogin";
pub const OAUTH_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const GDATA_VERSION: &str = "3.0";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const SOURCE: &str = concat!("edit-sheets-", env!("CARGO_PKG_VERSION"));

/// The API a ClientLogin token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Spreadsheets,
    Documents,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Spreadsheets => "wise",
            Service::Documents => "writely",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    OAuth(OAuthCredentials),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OAuthCredentials {
    #[serde(rename_all = "camelCase")]
    AccessToken { access_token: String },
    #[serde(rename_all = "camelCase")]
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    GoogleLogin,
    Bearer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub kind: TokenKind,
    pub token: String,
}

impl AuthToken {
    pub fn authorization(&self) -> String {
        match self.kind {
            TokenKind::GoogleLogin => format!("GoogleLogin auth={}", self.token),
            TokenKind::Bearer => format!("Bearer {}", self.token),
        }
    }

    /// Headers sent with every feed request.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), self.authorization()),
            ("GData-Version".to_string(), GDATA_VERSION.to_string()),
            ("Content-Type".to_string(), "application/atom+xml".to_string()),
            ("If-Match".to_string(), "*".to_string()),
        ]
    }
}

/// Obtain a token for `service`.
pub async fn authenticate<T: HttpTransport>(
    transport: &T,
    credentials: &Credentials,
    service: Service,
) -> Result<AuthToken> {
    let token = match credentials {
        Credentials::Password { username, password } => {
            client_login(transport, username, password, service).await?
        }
        Credentials::OAuth(OAuthCredentials::AccessToken { access_token }) => AuthToken {
            kind: TokenKind::Bearer,
            token: access_token.clone(),
        },
        Credentials::OAuth(OAuthCredentials::Refresh {
            client_id,
            client_secret,
            refresh_token,
        }) => refresh_access_token(transport, client_id, client_secret, refresh_token).await?,
    };

    tracing::info!(service = service.as_str(), kind = ?token.kind, "authenticated");
    Ok(token)
}

async fn client_login<T: HttpTransport>(
    transport: &T,
    username: &str,
    password: &str,
    service: Service,
) -> Result<AuthToken> {
    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("accountType", "HOSTED_OR_GOOGLE")
        .append_pair("Email", username)
        .append_pair("Passwd", password)
        .append_pair("service", service.as_str())
        .append_pair("source", SOURCE)
        .finish();

    let request = HttpRequest::post(CLIENT_LOGIN_URL, form).header("Content-Type", FORM_CONTENT_TYPE);
    let response = transport.execute(request).await?;

    if !response.is_success() {
        return Err(SheetError::AuthFailed {
            status: response.status,
            body: response.body,
        });
    }

    let token = parse_client_login(&response.body).ok_or_else(|| {
        SheetError::UnexpectedResponse("ClientLogin response has no Auth line".into())
    })?;

    Ok(AuthToken {
        kind: TokenKind::GoogleLogin,
        token,
    })
}

/// Pull the `Auth=` value out of a ClientLogin response body.
fn parse_client_login(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.trim().strip_prefix("Auth="))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

async fn refresh_access_token<T: HttpTransport>(
    transport: &T,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<AuthToken> {
    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("client_secret", client_secret)
        .append_pair("refresh_token", refresh_token)
        .append_pair("grant_type", "refresh_token")
        .finish();

    let request = HttpRequest::post(OAUTH_TOKEN_URL, form).header("Content-Type", FORM_CONTENT_TYPE);
    let response = transport.execute(request).await?;

    if !response.is_success() {
        return Err(SheetError::AuthFailed {
            status: response.status,
            body: response.body,
        });
    }

    let parsed: TokenResponse = serde_json::from_str(&response.body)?;
    Ok(AuthToken {
        kind: TokenKind::Bearer,
        token: parsed.access_token,
    })
}
