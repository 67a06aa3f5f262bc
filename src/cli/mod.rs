pub mod message;
pub mod tx;

use clap::{Parser, Subcommand};

use crate::account::Account;
use crate::client::GatewayClient;
use crate::config::AccountConfig;
use crate::crypto::{parse_felt, FieldElement, KeyPair};
use crate::error::{AccountError, Result};

#[derive(Parser, Debug)]
#[command(name = "stark-account")]
#[command(about = "Sign and submit transactions through a Starknet account contract", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "stark-account.toml")]
    pub config: String,

    /// Account private key (hex or decimal)
    #[arg(long, global = true, env = "STARK_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Account contract address, overrides the config file
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Gateway base URL, overrides the config file
    #[arg(long, global = true)]
    pub gateway: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the public key derived from the private key
    PublicKey,
    /// Query the account contract's current nonce
    Nonce,
    /// Sign and submit a single invocation through the account
    Execute {
        /// Target contract address
        #[arg(long)]
        to: String,
        /// Entrypoint name on the target contract
        #[arg(long)]
        entrypoint: String,
        /// JSON array of arguments, e.g. '["0x2", 100, [1, 2]]'
        #[arg(long, default_value = "[]")]
        calldata: String,
        /// Use this nonce instead of querying the account
        #[arg(long)]
        nonce: Option<String>,
    },
    /// Print the hash of a typed-data message for this account
    HashMessage {
        #[arg(long)]
        file: String,
    },
    /// Sign a typed-data message
    SignMessage {
        #[arg(long)]
        file: String,
    },
    /// Check a signature over a typed-data message
    VerifyMessage {
        #[arg(long)]
        file: String,
        /// Signature as 'r,s'
        #[arg(long)]
        signature: String,
        /// Check against the local public key instead of the account contract
        #[arg(long)]
        local: bool,
    },
}

impl Cli {
    pub fn keypair(&self) -> Result<KeyPair> {
        let key = self.private_key.as_deref().ok_or_else(|| {
            AccountError::Config("no private key: pass --private-key or set STARK_PRIVATE_KEY".to_string())
        })?;
        KeyPair::from_hex(key)
    }

    pub fn account_address(&self, config: &AccountConfig) -> Result<FieldElement> {
        match &self.address {
            Some(address) => parse_felt(address),
            None => config.account_address(),
        }
    }

    /// Applies command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut AccountConfig) {
        if let Some(gateway) = &self.gateway {
            config.gateway.base_url = gateway.clone();
        }
        if let Some(address) = &self.address {
            config.account.address = Some(address.clone());
        }
    }

    pub fn build_account(&self, config: &AccountConfig) -> Result<Account<GatewayClient, KeyPair>> {
        let provider = GatewayClient::from_config(&config.gateway)?;
        Ok(Account::new(provider, self.keypair()?, self.account_address(config)?))
    }
}

pub async fn run(cli: &Cli, config: &AccountConfig) -> Result<()> {
    match &cli.command {
        Commands::PublicKey => tx::handle_public_key_command(cli),
        Commands::Nonce => tx::handle_nonce_command(cli, config).await,
        Commands::Execute {
            to,
            entrypoint,
            calldata,
            nonce,
        } => tx::handle_execute_command(cli, config, to, entrypoint, calldata, nonce.as_deref()).await,
        Commands::HashMessage { file } => message::handle_hash_command(cli, config, file),
        Commands::SignMessage { file } => message::handle_sign_command(cli, config, file),
        Commands::VerifyMessage {
            file,
            signature,
            local,
        } => message::handle_verify_command(cli, config, file, signature, *local).await,
    }
}
