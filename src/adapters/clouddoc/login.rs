//! Installed-app OAuth2 login with a loopback redirect
//!
//! The consent page redirects the browser to `http://127.0.0.1:<port>/` with
//! an authorization code, which is exchanged for tokens and written to the
//! token store.

use super::auth::{request_token, ClientSecrets, SCOPES, TOKEN_KEY};
use super::token_store::{StoredToken, TokenStore};
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

/// How long to wait for the browser to come back
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct CodeExchangeRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

/// Builds the consent page URL
///
/// # Errors
///
/// Returns [`Md2NoteError::Configuration`] when the client secrets carry an
/// invalid `auth_uri`.
pub fn authorization_url(secrets: &ClientSecrets, redirect_uri: &str, state: &str) -> Result<Url> {
    let mut url = Url::parse(&secrets.auth_uri).map_err(|e| {
        Md2NoteError::Configuration(format!("Invalid auth_uri '{}': {e}", secrets.auth_uri))
    })?;
    url.query_pairs_mut()
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("state", state);
    Ok(url)
}

/// Runs the login flow and stores the resulting token
///
/// `on_url` receives the consent page URL; the caller shows it to the user.
///
/// # Errors
///
/// Returns [`Md2NoteError::Authentication`] when consent is denied, the
/// redirect does not match, the wait times out or the code exchange is
/// rejected.
pub async fn login<F>(
    secrets: &ClientSecrets,
    store: &dyn TokenStore,
    http: &reqwest::Client,
    on_url: F,
) -> Result<StoredToken>
where
    F: FnOnce(&Url),
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://127.0.0.1:{port}/");
    let state = uuid::Uuid::new_v4().to_string();

    let url = authorization_url(secrets, &redirect_uri, &state)?;
    on_url(&url);

    tracing::info!(port, "Waiting for OAuth redirect");
    let code = tokio::time::timeout(LOGIN_TIMEOUT, wait_for_code(&listener, &state))
        .await
        .map_err(|_| {
            Md2NoteError::Authentication("Timed out waiting for authorization".to_string())
        })??;

    let request = CodeExchangeRequest {
        grant_type: "authorization_code",
        code: &code,
        client_id: &secrets.client_id,
        client_secret: secrets.client_secret.expose_secret().as_ref(),
        redirect_uri: &redirect_uri,
    };
    let token = request_token(http, &secrets.token_uri, &request)
        .await?
        .into_stored(None);

    if token.refresh_token().is_none() {
        tracing::warn!("Token endpoint returned no refresh token; the login will expire");
    }

    store.save(TOKEN_KEY, &token)?;
    tracing::info!("Login complete");
    Ok(token)
}

async fn wait_for_code(listener: &TcpListener, expected_state: &str) -> Result<String> {
    loop {
        let (mut stream, _) = listener.accept().await?;
        let mut request_line = String::new();
        {
            let mut reader = BufReader::new(&mut stream);
            reader.read_line(&mut request_line).await?;
        }

        let callback = parse_callback(&request_line);
        let (status, message) = match &callback {
            Callback::Ignored => ("404 Not Found", "Not found"),
            Callback::Code { .. } => ("200 OK", "Login complete. You can close this window."),
            Callback::Denied(_) => ("200 OK", "Login failed. You can close this window."),
        };
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{message}",
            message.len()
        );
        // The browser may already have gone away
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;

        match callback {
            Callback::Ignored => continue,
            Callback::Denied(reason) => {
                return Err(Md2NoteError::Authentication(format!(
                    "Authorization denied: {reason}"
                )))
            }
            Callback::Code { code, state } => {
                if state != expected_state {
                    return Err(Md2NoteError::Authentication(
                        "OAuth state mismatch in redirect".to_string(),
                    ));
                }
                return Ok(code);
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code { code: String, state: String },
    Denied(String),
    Ignored,
}

/// Parses `GET /?code=...&state=... HTTP/1.1`
fn parse_callback(request_line: &str) -> Callback {
    let Some(target) = request_line.split_whitespace().nth(1) else {
        return Callback::Ignored;
    };
    let Ok(url) = Url::parse(&format!("http://127.0.0.1{target}")) else {
        return Callback::Ignored;
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Callback::Denied(value.into_owned()),
            _ => {}
        }
    }

    match code {
        Some(code) => Callback::Code {
            code,
            state: state.unwrap_or_default(),
        },
        None => Callback::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clouddoc::token_store::MemoryTokenStore;

    fn secrets(token_uri: &str) -> ClientSecrets {
        ClientSecrets::parse(&format!(
            r#"{{"installed":{{"client_id":"cid","client_secret":"cs","token_uri":"{token_uri}"}}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = authorization_url(&secrets("http://t"), "http://127.0.0.1:8080/", "xyz").unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert_eq!(pairs["client_id"], "cid");
        assert_eq!(pairs["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(pairs["state"], "xyz");
        assert_eq!(pairs["access_type"], "offline");
        assert!(pairs["scope"].contains("auth/documents"));
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(
            parse_callback("GET /?code=abc&state=s1 HTTP/1.1\r\n"),
            Callback::Code {
                code: "abc".to_string(),
                state: "s1".to_string()
            }
        );
        assert_eq!(
            parse_callback("GET /?error=access_denied HTTP/1.1\r\n"),
            Callback::Denied("access_denied".to_string())
        );
        assert_eq!(parse_callback("GET /favicon.ico HTTP/1.1\r\n"), Callback::Ignored);
        assert_eq!(parse_callback(""), Callback::Ignored);
    }

    #[tokio::test]
    async fn test_login_exchanges_code_and_stores_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                mockito::Matcher::UrlEncoded("code".into(), "the-code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"at","refresh_token":"rt","expires_in":3600}"#)
            .create_async()
            .await;

        let secrets = secrets(&format!("{}/token", server.url()));
        let store = MemoryTokenStore::new();
        let http = reqwest::Client::new();

        let token = login(&secrets, &store, &http, |url| {
            let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
            let redirect = format!(
                "{}?code=the-code&state={}",
                pairs["redirect_uri"], pairs["state"]
            );
            tokio::spawn(async move {
                let _ = reqwest::get(redirect).await;
            });
        })
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(token.access_token(), "at");
        let stored = store.load(TOKEN_KEY).unwrap().unwrap();
        assert_eq!(stored.refresh_token(), Some("rt"));
    }
}
