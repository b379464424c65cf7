use anyhow::{Context, Result};
use clap::Parser;
use horizons_core::{create_environment_with_config, ToolCall};
use pinpad_rs::{LayoutName, ACTION_SPACE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Roll a uniformly random policy through a Pin Pad layout.
#[derive(Parser, Debug)]
struct Args {
    /// Preset layout name.
    #[arg(long, default_value_t = LayoutName::Three)]
    layout: LayoutName,
    /// Single-target pad pattern, e.g. 1231.
    #[arg(long)]
    target: Option<String>,
    #[arg(long, default_value_t = 3)]
    episodes: u32,
    #[arg(long, default_value_t = 200)]
    steps: u32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    pinpad_env::register_default_env();
    let config = json!({
        "layout": args.layout,
        "target": args.target,
        "seed": args.seed,
        "include_image": false,
    });
    let mut env = create_environment_with_config("PinPad", Some(config))
        .context("building PinPad environment")?;
    env.initialize().await?;
    tracing::info!(layout = %args.layout, episodes = args.episodes, steps = args.steps, "starting rollout");

    let mut policy = StdRng::seed_from_u64(args.seed);
    for episode in 0..args.episodes {
        let seed = args.seed.wrapping_add(u64::from(episode));
        env.step(vec![ToolCall::new("reset", json!({"seed": seed}))]).await?;
        let mut obs = None;
        for _ in 0..args.steps {
            let action = ACTION_SPACE.sample(&mut policy);
            obs = Some(env.step(vec![ToolCall::new("interact", json!({"action": action}))]).await?);
        }
        if let Some(obs) = obs {
            tracing::info!(
                episode,
                sequence = %obs.data["sequence"],
                total_reward = %obs.data["total_reward"],
                "episode finished"
            );
        }
    }

    let snap = env.checkpoint().await?;
    tracing::debug!(snapshot = %snap.data, "final checkpoint");
    env.terminate().await?;
    Ok(())
}
