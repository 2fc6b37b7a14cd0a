use chrono::{Duration, Utc};
use hyphen::link::{
    CreateQrCodeOptions, CreateShortCodeOptions, Pagination, QrSize, ShortCodeQuery,
    UpdateShortCodeOptions,
};

#[tokio::main]
async fn main() -> hyphen::Result<()> {
    // Configure env_logger to see Hyphen SDK logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("hyphen")).init();

    let api_key =
        std::env::var("HYPHEN_API_KEY").expect("HYPHEN_API_KEY env variable should contain API key");
    let organization_id = std::env::var("HYPHEN_ORGANIZATION_ID")
        .expect("HYPHEN_ORGANIZATION_ID env variable should contain organization id");
    let link = hyphen::LinkConfig::from_api_key(api_key)
        .organization_id(organization_id)
        .to_client()?;

    let short_code = link
        .create_short_code(
            "https://hyphen.ai",
            "test.h4n.link",
            &CreateShortCodeOptions {
                title: Some("Hyphen Homepage".to_owned()),
                tags: vec!["example".to_owned(), "homepage".to_owned()],
                ..Default::default()
            },
        )
        .await?;
    println!("Short URL: https://{}/{}", short_code.domain, short_code.code);

    let updated = link
        .update_short_code(
            &short_code.id,
            &UpdateShortCodeOptions {
                title: Some("Updated Title".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    println!("Updated title: {:?}", updated.title);

    let qr_code = link
        .create_qr_code(
            &short_code.id,
            &CreateQrCodeOptions {
                title: Some("My QR Code".to_owned()),
                size: Some(QrSize::Medium),
                ..Default::default()
            },
        )
        .await?;
    println!("QR link: {}", qr_code.qr_link);

    let page = link
        .get_short_codes(&ShortCodeQuery {
            tags: vec!["example".to_owned()],
            pagination: Pagination::new(1, 10),
            ..Default::default()
        })
        .await?;
    println!("{} short codes tagged 'example'", page.total);

    println!("Tags: {:?}", link.get_tags().await?);

    let stats = link
        .get_code_stats(&short_code.id, Utc::now() - Duration::days(7), Utc::now())
        .await?;
    println!("Clicks in the last week: {}", stats.clicks.total);

    link.delete_qr_code(&short_code.id, &qr_code.id).await?;
    link.delete_short_code(&short_code.id).await?;

    Ok(())
}
