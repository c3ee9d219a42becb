use anyhow::Result;
use apptsync_core::config::SyncConfig;
use apptsync_core::remote::Provider;

pub async fn run(config: &SyncConfig) -> Result<()> {
    let provider = Provider::from_name(&config.provider);

    println!("Authenticating with {}...", provider.name());

    // Provider handles the full OAuth flow and stores credentials/tokens
    let account = provider.authenticate(None).await?;

    println!("Authenticated as: {}\n", account);
    println!("Now add the account to {}:\n", SyncConfig::config_path()?.display());
    println!("{}_account = \"{}\"", provider.name(), account);
    println!("calendar_id = \"{}\"", config.calendar_id);
    println!("\nThen run `apptsync sync`.");

    Ok(())
}
