// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vsrx_synth::application::Application;
use vsrx_synth::configuration::SynthOptions;
use vsrx_synth::lookups::AwsLookups;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = SynthOptions::parse();

    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();
    if options.log_json {
        subscriber
            .json()
            // this needs to be set to remove duplicated information in the log.
            .with_current_span(false)
            .with_ansi(false)
            .init();
    } else {
        subscriber.init();
    }

    tracing::info!("[synth] {:?}", &options);

    let application = Application::build(options.clone())?;

    let assembly = if options.skip_lookups {
        tracing::warn!("[synth] skipping context lookups");
        application.run::<AwsLookups>(None).await?
    } else {
        let lookups = AwsLookups::new(&options.region).await;
        application.run(Some(&lookups)).await?
    };

    for name in assembly.deploy_order() {
        println!("{name}");
    }

    Ok(())
}
