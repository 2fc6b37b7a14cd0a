use hyphen::{toggle::EvaluationContext, Error};

#[tokio::main]
async fn main() -> hyphen::Result<()> {
    // Configure env_logger to see Hyphen SDK logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("hyphen")).init();

    // Reads HYPHEN_PUBLIC_API_KEY, HYPHEN_API_KEY, HYPHEN_APPLICATION_ID, HYPHEN_ENVIRONMENT and
    // HYPHEN_ORGANIZATION_ID.
    let hyphen = hyphen::HyphenConfig::from_env()
        .error_handler(|err: &Error| {
            println!("Hyphen error: {}", err);
        })
        .to_client()?;

    match hyphen.toggle() {
        Some(toggle) => {
            let context = EvaluationContext::with_targeting_key("user-123");
            let enabled = toggle
                .get_boolean("hyphen-sdk-boolean", false, Some(&context))
                .await;
            println!("hyphen-sdk-boolean: {}", enabled);
        }
        None => println!("Toggle is not configured, set HYPHEN_PUBLIC_API_KEY"),
    }

    match hyphen.netinfo() {
        Some(netinfo) => {
            if let Ok(info) = netinfo.get_ip_info("8.8.8.8").await {
                println!("8.8.8.8 is in {}", info.location.country);
            }
        }
        None => println!("NetInfo is not configured, set HYPHEN_API_KEY"),
    }

    match hyphen.link() {
        Some(link) => {
            if let Ok(tags) = link.get_tags().await {
                println!("Link tags: {:?}", tags);
            }
        }
        None => println!("Link is not configured, set HYPHEN_API_KEY"),
    }

    Ok(())
}
