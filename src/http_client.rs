use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

static CLIENT: OnceCell<Client> = OnceCell::new();

// No request timeout on purpose: the backend runs locally and a hanging
// request leaves its resource flagged as loading rather than erroring out.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .build()
            .context("failed to build http client")
    })
}
