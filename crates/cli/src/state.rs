//! On-disk state: every deployed token plus the registry, as JSON.

use anyhow::{anyhow, bail, Context, Result};
use ikf_registry::{KnowledgeRegistry, RegistryConfig, RegistryLimits, RegistrySnapshot};
use ikf_token::{KnowledgeToken, RewardIssuer, TokenSnapshot};
use ikf_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    tokens: Vec<TokenSnapshot>,
    registry: RegistrySnapshot,
}

/// A loaded deployment.
pub struct Deployment {
    pub tokens: Vec<Arc<KnowledgeToken>>,
    pub registry: KnowledgeRegistry,
}

impl Deployment {
    /// Deploy a token owned by `admin` and a registry administered by `admin`,
    /// then authorize the registry to mint.
    pub fn init(
        admin: Address,
        token_address: Address,
        registry_address: Address,
        initial_supply: TokenAmount,
        limits: RegistryLimits,
    ) -> Result<Self> {
        let token = Arc::new(KnowledgeToken::new(token_address, admin, initial_supply));
        let config = RegistryConfig::new(registry_address, admin).with_limits(limits);
        let registry = KnowledgeRegistry::new(config, token.clone())?;
        token.add_minter(&admin, registry_address)?;
        Ok(Self {
            tokens: vec![token],
            registry,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read state file {} (run `ikf init` first)",
                path.display()
            )
        })?;
        let state: StateFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse state file {}", path.display()))?;

        let tokens = state
            .tokens
            .into_iter()
            .map(|snapshot| KnowledgeToken::restore(snapshot).map(Arc::new))
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("corrupt token state in {}", path.display()))?;
        let issuer = tokens
            .iter()
            .find(|token| token.address() == state.registry.reward_issuer)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "state file has no token {} for the registry",
                    state.registry.reward_issuer
                )
            })?;
        let registry = KnowledgeRegistry::restore(state.registry, issuer)?;

        debug!("Loaded state from {}", path.display());
        Ok(Self { tokens, registry })
    }

    /// Write via a temporary sibling and rename, so a crash never leaves a
    /// truncated state file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let state = StateFile {
            tokens: self.tokens.iter().map(|token| token.snapshot()).collect(),
            registry: self.registry.snapshot(),
        };
        let json = serde_json::to_string_pretty(&state)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;

        debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn token(&self, address: &Address) -> Result<Arc<KnowledgeToken>> {
        self.tokens
            .iter()
            .find(|token| token.address() == *address)
            .cloned()
            .ok_or_else(|| anyhow!("no token deployed at {}", address))
    }

    pub fn bound_token(&self) -> Result<Arc<KnowledgeToken>> {
        self.token(&self.registry.reward_issuer())
    }

    pub fn deploy_token(
        &mut self,
        owner: Address,
        address: Address,
        initial_supply: TokenAmount,
    ) -> Result<Arc<KnowledgeToken>> {
        if address.is_zero() {
            bail!("token address cannot be the null identity");
        }
        if self.token(&address).is_ok() {
            bail!("a token is already deployed at {}", address);
        }
        let token = Arc::new(KnowledgeToken::new(address, owner, initial_supply));
        self.tokens.push(token.clone());
        Ok(token)
    }
}
