use std::error::Error;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use coup_env::protocol::protocol;
use coup_env::{Coup, GameConfig};

const MAX_STEPS: usize = 10_000;

// coup-env [--dot] [--config FILE] [SEED]
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coup_env=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = GameConfig::default();
    let mut seed = 0;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dot" => {
                println!("{}", protocol().to_dot());
                return Ok(());
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a file")?;
                config = GameConfig::from_json(&std::fs::read_to_string(path)?)?;
            }
            _ => seed = arg.parse()?,
        }
    }

    let mut coup = Coup::new(config, seed)?;
    let mut rng = Pcg64::seed_from_u64(seed);

    for _ in 0..MAX_STEPS {
        if let Some(frame) = coup.render() {
            println!("{frame}");
        }
        if coup.is_done() {
            break;
        }

        let legal: Vec<usize> = coup.action_mask()
            .iter()
            .enumerate()
            .filter(|&(_, &ok)| ok)
            .map(|(idx, _)| idx)
            .collect();
        let index = legal[rng.gen_range(0..legal.len())];
        let seat = coup.agent_selection();
        let step = coup.step(index)?;
        debug!(seat, action = ?coup.action_space().action(index), next = step.seat, "step");
    }

    Ok(())
}
