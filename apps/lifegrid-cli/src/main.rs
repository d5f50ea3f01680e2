use clap::{Parser, Subcommand};
use lifegrid_common::{
    ALIVE_PROBABILITY, DEFAULT_SEED, GRID_SIZE, UPDATE_INTERVAL, WORKGROUP_SIZE, GridSize,
    workgroup_count,
};
use lifegrid_kernel::LifeWorld;
use lifegrid_render::{DebugTextRenderer, Renderer};
use lifegrid_render_wgpu::{GpuContext, GridState, LifeSimulator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lifegrid-cli", about = "CLI tool for lifegrid operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, fixed configuration and the GPU adapter in use
    Info,
    /// Run the host reference simulation and print generation hashes
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Seed for the random initial generation
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Print the final generation as text
        #[arg(long)]
        show: bool,
    },
    /// Run the GPU pipeline headless and compare each generation with the host reference
    Verify {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Seed for the random initial generation
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Grid width in cells
        #[arg(long, default_value_t = GRID_SIZE as i64, allow_hyphen_values = true)]
        width: i64,
        /// Grid height in cells
        #[arg(long, default_value_t = GRID_SIZE as i64, allow_hyphen_values = true)]
        height: i64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let size = GridSize::square(GRID_SIZE)?;
            let (groups_x, groups_y) = workgroup_count(size);
            println!("lifegrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lifegrid_common::crate_info());
            println!("render: {}", lifegrid_render::crate_info());
            println!(
                "grid: {}x{}, tile {WORKGROUP_SIZE}x{WORKGROUP_SIZE}, dispatch {groups_x}x{groups_y}",
                size.width(),
                size.height()
            );
            println!(
                "tick interval: {:?}, alive probability: {ALIVE_PROBABILITY}",
                UPDATE_INTERVAL
            );
            match GpuContext::headless() {
                Ok(gpu) => println!("adapter: {}", gpu.adapter_summary()),
                Err(e) => println!("adapter: unavailable ({e})"),
            }
        }
        Commands::Run { ticks, seed, show } => {
            println!("Reference run: seed={seed}, ticks={ticks}");

            let initial =
                GridState::prepare(GRID_SIZE as i64, GRID_SIZE as i64, ALIVE_PROBABILITY, seed)?;
            let mut world = LifeWorld::new(initial);
            tracing::debug!(
                seed,
                alive = world.current().alive_count(),
                "initial generation drawn"
            );
            println!(
                "step 0: alive={}, hash={:#018x}",
                world.current().alive_count(),
                world.current().state_hash()
            );
            for _ in 0..ticks {
                world.tick();
                println!(
                    "step {}: alive={}, hash={:#018x}",
                    world.step(),
                    world.current().alive_count(),
                    world.current().state_hash()
                );
            }

            if show {
                print!(
                    "{}",
                    DebugTextRenderer::new().render(world.current(), world.step())
                );
            }
        }
        Commands::Verify {
            ticks,
            seed,
            width,
            height,
        } => {
            println!("GPU verification: {width}x{height}, seed={seed}, ticks={ticks}");

            let initial = GridState::prepare(width, height, ALIVE_PROBABILITY, seed)?;
            let gpu = GpuContext::headless()?;
            println!("adapter: {}", gpu.adapter_summary());
            tracing::info!(width, height, seed, ticks, "starting headless verification");

            let grid = GridState::upload(&gpu, &initial)?;
            // Never drawn into; the render pipeline still needs a colour format.
            let mut simulator =
                LifeSimulator::new(&gpu, grid, wgpu::TextureFormat::Rgba8Unorm)?;
            let mut reference = LifeWorld::new(initial);

            let mut mismatches = 0u64;
            for _ in 0..ticks {
                simulator.advance(&gpu)?;
                reference.tick();
                let on_device = simulator.current_generation(&gpu)?;
                let ok = &on_device == reference.current();
                if !ok {
                    mismatches += 1;
                    tracing::warn!(step = simulator.step(), "device generation diverged");
                }
                println!(
                    "step {}: device={:#018x} reference={:#018x} {}",
                    simulator.step(),
                    on_device.state_hash(),
                    reference.current().state_hash(),
                    if ok { "OK" } else { "MISMATCH" }
                );
            }
            simulator.teardown();
            tracing::debug!(mismatches, "verification finished");

            if mismatches > 0 {
                anyhow::bail!("{mismatches} of {ticks} generations diverged from the reference");
            }
            println!("Match: OK");
        }
    }

    Ok(())
}

