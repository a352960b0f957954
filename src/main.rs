use invitelinks::{config::Config, handler};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let config = Config::from_env()?;
    let ctx = handler::Ctx::new(config).await;

    run(service_fn(move |event: LambdaEvent<Value>| {
        let ctx = ctx.clone();
        async move { Ok::<_, Error>(handler::router(event.payload, &ctx).await) }
    }))
    .await
}
