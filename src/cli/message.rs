use tracing::info;

use crate::cli::Cli;
use crate::config::AccountConfig;
use crate::crypto::Signature;
use crate::error::{AccountError, Result};
use crate::signer::Signer;
use crate::typed_data::TypedData;

pub fn load_typed_data(path: &str) -> Result<TypedData> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AccountError::Usage(format!("Could not read '{}': {}", path, e)))?;
    TypedData::from_json_str(&json)
}

pub fn handle_hash_command(cli: &Cli, config: &AccountConfig, file: &str) -> Result<()> {
    let typed_data = load_typed_data(file)?;
    let hash = typed_data.message_hash(cli.account_address(config)?)?;
    println!("{:#x}", hash);
    Ok(())
}

pub fn handle_sign_command(cli: &Cli, config: &AccountConfig, file: &str) -> Result<()> {
    let typed_data = load_typed_data(file)?;
    let keypair = cli.keypair()?;
    let signature = keypair.sign_message(&typed_data, cli.account_address(config)?)?;
    println!("{}", signature);
    Ok(())
}

pub async fn handle_verify_command(
    cli: &Cli,
    config: &AccountConfig,
    file: &str,
    signature: &str,
    local: bool,
) -> Result<()> {
    let typed_data = load_typed_data(file)?;
    let signature: Signature = signature.parse()?;

    let account = cli.build_account(config)?;
    let valid = if local {
        account.verify_message_locally(&typed_data, &signature)
    } else {
        info!("Asking account {:#x} to check the signature", account.address());
        account.verify_message(&typed_data, &signature).await
    };

    if valid {
        println!("✅ Signature is valid");
    } else {
        println!("❌ Signature is NOT valid");
    }
    Ok(())
}
