use hyphen::netinfo::IpInfoResult;

#[tokio::main]
async fn main() -> hyphen::Result<()> {
    // Configure env_logger to see Hyphen SDK logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("hyphen")).init();

    let api_key =
        std::env::var("HYPHEN_API_KEY").expect("HYPHEN_API_KEY env variable should contain API key");
    let netinfo = hyphen::NetInfoConfig::from_api_key(api_key).to_client()?;

    let info = netinfo.get_ip_info("8.8.8.8").await?;
    println!(
        "{} ({}): {}, {}, {}",
        info.ip, info.ip_type, info.location.city, info.location.region, info.location.country
    );

    for result in netinfo.get_ip_infos(&["8.8.8.8", "1.1.1.1"]).await? {
        match result {
            IpInfoResult::Info(info) => println!("{}: {}", info.ip, info.location.timezone),
            IpInfoResult::Error(err) => println!("{}: {}", err.ip, err.error_message),
        }
    }

    Ok(())
}
