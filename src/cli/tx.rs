use crate::cli::Cli;
use crate::config::AccountConfig;
use crate::crypto::parse_felt;
use crate::encoding::ArgValue;
use crate::error::{AccountError, Result};
use crate::transaction::{Invocation, InvocationsDetails};

pub fn handle_public_key_command(cli: &Cli) -> Result<()> {
    let keypair = cli.keypair()?;
    println!("{:#x}", keypair.public_key());
    Ok(())
}

pub async fn handle_nonce_command(cli: &Cli, config: &AccountConfig) -> Result<()> {
    let account = cli.build_account(config)?;
    let nonce = account.get_nonce().await?;
    println!("{}", nonce);
    Ok(())
}

/// Parses `--calldata` as a JSON array of arguments.
pub fn parse_calldata(json: &str) -> Result<Vec<ArgValue>> {
    serde_json::from_str(json)
        .map_err(|e| AccountError::Usage(format!("--calldata must be a JSON array of arguments: {}", e)))
}

pub async fn handle_execute_command(
    cli: &Cli,
    config: &AccountConfig,
    to: &str,
    entrypoint: &str,
    calldata: &str,
    nonce: Option<&str>,
) -> Result<()> {
    let invocation = Invocation::new(parse_felt(to)?, entrypoint).with_calldata(parse_calldata(calldata)?);
    let details = InvocationsDetails {
        nonce: nonce.map(parse_felt).transpose()?,
    };

    let account = cli.build_account(config)?;
    println!("Submitting {} on {} via {:#x}...", entrypoint, to, account.address());
    let result = account.execute(&[invocation], &[], &details).await?;

    println!("✅ {}", result.code);
    println!("   Transaction hash: {:#x}", result.transaction_hash);
    Ok(())
}
