use crate::core::config::GlobeConfig;
use crate::core::errors::GlobeError;
use crate::core::kernel::{ReqwestRest, RestClientBuilder, RestClientConfig, Signer};
use crate::exchanges::globe::connector::GlobeClient;
use crate::exchanges::globe::signer::GlobeSigner;
use std::sync::Arc;

/// Signer for the configured credentials, if any are complete
pub fn build_signer(config: &GlobeConfig) -> Result<Option<Arc<GlobeSigner>>, GlobeError> {
    match &config.credentials {
        Some(credentials) if credentials.is_complete() => {
            Ok(Some(Arc::new(GlobeSigner::new(credentials)?)))
        }
        _ => Ok(None),
    }
}

/// Reqwest REST client for `config`, signing private calls with `signer`
pub fn build_rest_client(
    config: &GlobeConfig,
    signer: Option<Arc<GlobeSigner>>,
) -> Result<ReqwestRest, GlobeError> {
    let rest_config = RestClientConfig::new(config.rest_url.clone(), "globe".to_string())
        .with_user_agent(config.user_agent.clone());

    let mut rest_builder = RestClientBuilder::new(rest_config);

    // Add authentication if available
    if let Some(signer) = signer {
        rest_builder = rest_builder.with_signer(signer as Arc<dyn Signer>);
    }

    rest_builder.build()
}

/// Create a Globe client with the reqwest REST transport
pub fn build_client(config: GlobeConfig) -> Result<GlobeClient<ReqwestRest>, GlobeError> {
    config.validate()?;
    let signer = build_signer(&config)?;
    let rest = build_rest_client(&config, signer.clone())?;
    Ok(GlobeClient::from_parts(config, rest, signer))
}
