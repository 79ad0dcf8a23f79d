use serde::Deserialize;
use stratum::config::{ResolveOptions, Resolver, StaticModules};
use stratum::{AppContext, Value};

#[derive(Debug, Deserialize)]
struct AppConfig {
    app: AppSection,
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
struct AppSection {
    name: String,
    debug: bool,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    url: Option<String>,
    pool: i64,
}

fn main() -> Result<(), stratum::Error> {
    tracing_subscriber::fmt::init();

    // Defaults are embedded; the dev document overrides them field by field.
    // DATABASE_URL is read from the live environment at resolution time.
    let resolver = Resolver::builder()
        .with_resource("config/defaults.yaml", include_str!("defaults.yaml"))
        .with_resource("config/dev.yaml", include_str!("dev.yaml"))
        .with_module_loader(StaticModules::new().with_binding(
            "app::secrets",
            "api_key",
            Value::String("demo-key".into()),
        ))
        .build();

    let ctx = AppContext::builder()
        .with_resolver(resolver)
        .with_options(ResolveOptions::new().with_config_path("config/dev.yaml"))
        .start()?;

    // Deserialize once; reads are zero-cost afterwards.
    let config: AppConfig = ctx.config().to_typed().map_err(stratum::ConfigError::from)?;

    println!("app: {} (debug={})", config.app.name, config.app.debug);
    println!(
        "database: url={} pool={}",
        config.database.url.as_deref().unwrap_or("<unset>"),
        config.database.pool
    );
    println!(
        "api key: {:?}",
        ctx.config().get("secrets").and_then(|s| s.get("api_key"))
    );

    ctx.stop();
    Ok(())
}
