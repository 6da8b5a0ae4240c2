use std::io::Read;
use std::path::PathBuf;

use chip16::{
    graphics::{SCREEN_HEIGHT, SCREEN_WIDTH},
    op, Opcode, Vm,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

mod rom;
use rom::Rom;

/// Headless Chip16 runner
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// ROM to load and execute
    rom: PathBuf,

    /// Entry point, overriding the ROM header
    #[clap(long, value_parser = parse_hex)]
    start: Option<u16>,

    /// Seed for the `RND` instruction
    #[clap(long)]
    seed: Option<u64>,

    /// Stop after this many frames (vertical blanks)
    #[clap(long)]
    frames: Option<u64>,

    /// Stop after this many instructions
    #[clap(long)]
    steps: Option<u64>,

    /// Write the final frame to a PNG file
    #[clap(long)]
    screenshot: Option<PathBuf>,
}

fn parse_hex(s: &str) -> Result<u16, std::num::ParseIntError> {
    match s.strip_prefix("0x") {
        Some(h) => u16::from_str_radix(h, 16),
        None => s.parse(),
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("CHIP16_LOG", "info")
        .write_style_or("CHIP16_LOG", "always");
    env_logger::init_from_env(env);

    let args = Args::parse();
    anyhow::ensure!(
        args.frames.is_some() || args.steps.is_some(),
        "a headless run needs --frames or --steps to stop"
    );

    let mut f = std::fs::File::open(&args.rom)
        .with_context(|| format!("failed to open {:?}", args.rom))?;
    let mut bytes = vec![];
    f.read_to_end(&mut bytes).context("failed to read file")?;
    let rom = Rom::parse(&bytes)
        .with_context(|| format!("failed to parse {:?}", args.rom))?;

    let mut vm = match args.seed {
        Some(s) => Vm::seeded(s),
        None => Vm::new(),
    };
    let start = args.start.unwrap_or(rom.start);
    vm.load(rom.data, start).context("failed to load ROM")?;

    let t = std::time::Instant::now();
    let mut steps = 0;
    let mut frames = 0;
    while args.steps.map_or(true, |n| steps < n)
        && args.frames.map_or(true, |n| frames < n)
    {
        let pc = vm.state().pc;
        if let Err(e) = vm.step() {
            let i = usize::from(pc);
            let word = vm
                .state()
                .ram
                .get(i..i + 4)
                .map(|b| Opcode::from_bytes([b[0], b[1], b[2], b[3]]));
            let name = word.and_then(|o| op::mnemonic(o.op()));
            error!("fault at {pc:#06x} after {steps} steps: {e}");
            return Err(e).with_context(|| match (word, name) {
                (Some(o), Some(n)) => format!("{n} ({o}) at {pc:#06x}"),
                (Some(o), None) => format!("{o} at {pc:#06x}"),
                (None, _) => format!("fetch at {pc:#06x}"),
            });
        }
        steps += 1;
        if vm.graphics_mut().take_vblank() {
            frames += 1;
        }
    }
    info!("ran {steps} steps ({frames} frames) in {:?}", t.elapsed());

    if let Some(path) = &args.screenshot {
        let frame = vm.graphics_mut().frame().to_vec();
        let img = image::RgbaImage::from_raw(
            SCREEN_WIDTH as u32,
            SCREEN_HEIGHT as u32,
            frame,
        )
        .context("frame has the wrong size")?;
        img.save(path)
            .with_context(|| format!("failed to save {path:?}"))?;
        info!("saved screenshot to {path:?}");
    }

    Ok(())
}
