use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{PostalAddress, PostalLookup};
use crate::validation::{clean_cep, non_blank};

/// Client for `https://viacep.com.br/ws/{cep}/json/`.
#[derive(Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

/// ViaCEP answers 200 with `{"erro": true}` for unknown CEPs.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        }
    }

    fn into_address(self, cep: String) -> Option<PostalAddress> {
        if self.is_error() {
            return None;
        }
        let owned = |v: Option<String>| non_blank(v.as_deref()).map(str::to_string);
        Some(PostalAddress {
            cep,
            street: owned(self.logradouro),
            neighborhood: owned(self.bairro),
            city: owned(self.localidade),
            state: owned(self.uf),
        })
    }
}

impl ViaCepClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, cep: &str) -> String {
        format!("{}/{}/json/", self.base_url, cep)
    }
}

#[async_trait]
impl PostalLookup for ViaCepClient {
    async fn lookup(&self, cep: &str) -> Option<PostalAddress> {
        let cep = clean_cep(cep)?;
        let url = self.url_for(&cep);
        debug!("ViaCEP lookup {url}");

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("ViaCEP request failed for {cep}: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("ViaCEP returned HTTP {status} for {cep}");
            return None;
        }

        match response.json::<ViaCepResponse>().await {
            Ok(body) => body.into_address(cep),
            Err(e) => {
                warn!("ViaCEP body for {cep} could not be parsed: {e}");
                None
            }
        }
    }
}
