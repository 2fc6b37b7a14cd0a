use hyphen::{
    toggle::{EvaluationContext, User},
    Error,
};

#[tokio::main]
async fn main() -> hyphen::Result<()> {
    // Configure env_logger to see Hyphen SDK logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("hyphen")).init();

    let public_api_key = std::env::var("HYPHEN_PUBLIC_API_KEY")
        .expect("HYPHEN_PUBLIC_API_KEY env variable should contain a public API key");
    let toggle = hyphen::ToggleConfig::from_public_api_key(public_api_key)
        .application_id(std::env::var("HYPHEN_APPLICATION_ID").unwrap_or_default())
        .environment("development")
        .error_handler(|err: &Error| {
            println!("Toggle evaluation failed: {}", err);
        })
        .to_client()?;

    let context = EvaluationContext::with_targeting_key("user-123")
        .ip_address("203.0.113.7")
        .custom_attribute("plan", "premium")
        .user(User::new("user-123").email("user@example.com").name("Jane Doe"));

    let enabled = toggle
        .get_boolean("hyphen-sdk-boolean", false, Some(&context))
        .await;
    println!("hyphen-sdk-boolean: {}", enabled);

    let greeting = toggle
        .get_string("hyphen-sdk-string", "Hello", Some(&context))
        .await;
    println!("hyphen-sdk-string: {}", greeting);

    let limit = toggle.get_number("hyphen-sdk-number", 10.0, None).await;
    println!("hyphen-sdk-number: {}", limit);

    // The low-level call exposes the server's evaluation details.
    match toggle.evaluate("hyphen-sdk-json", Some(&context)).await {
        Ok(Some(evaluation)) => println!("hyphen-sdk-json: {:?}", evaluation),
        Ok(None) => println!("hyphen-sdk-json is not defined"),
        Err(err) => println!("error evaluating hyphen-sdk-json: {}", err),
    }

    Ok(())
}
