//! Headless LC-3 object image runner.
//!
//! Loads a `.obj` image, optionally queues keyboard input, runs to halt (or
//! budget exhaustion), and prints the display output to stdout.

use std::fs;
use std::process;

use emu_lc3::{Lc3, Lc3Config};
use format_lc3_obj::ObjImage;

struct Args {
    image_path: String,
    config: Lc3Config,
    input: String,
    ticked: bool,
}

fn usage() -> ! {
    eprintln!("Usage: lc3-runner [options] <image.obj>");
    eprintln!("       --ignore-privilege   disable bounds/privilege checks");
    eprintln!("       --no-randomize       zero memory instead of noise");
    eprintln!("       --seed <n>           seed the randomized fill");
    eprintln!("       --limit <n>          instruction budget (default 100000)");
    eprintln!("       --pc <hex>           start PC (default 3000)");
    eprintln!("       --input <text>       queue keyboard input");
    eprintln!("       --tick <ms>          run timer-driven at one step per interval");
    process::exit(1);
}

fn parse_args() -> Args {
    let mut config = Lc3Config::default();
    let mut image_path = None;
    let mut input = String::new();
    let mut ticked = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next().unwrap_or_else(|| {
                eprintln!("{name} needs a value");
                usage()
            })
        };
        match arg.as_str() {
            "--ignore-privilege" => config.ignore_privilege = true,
            "--no-randomize" => config.randomize = false,
            "--seed" => match value("--seed").parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => usage(),
            },
            "--limit" => match value("--limit").parse() {
                Ok(limit) => config.execution_limit = limit,
                Err(_) => usage(),
            },
            "--pc" => match u16::from_str_radix(&value("--pc"), 16) {
                Ok(pc) => config.start_pc = pc,
                Err(_) => usage(),
            },
            "--tick" => {
                ticked = true;
                match value("--tick").parse() {
                    Ok(ms) => config.tick_rate = ms,
                    Err(_) => usage(),
                }
            }
            "--input" => input = value("--input"),
            _ if arg.starts_with('-') => usage(),
            _ if image_path.is_some() => usage(),
            _ => image_path = Some(arg),
        }
    }

    let Some(image_path) = image_path else { usage() };
    Args {
        image_path,
        config,
        input,
        ticked,
    }
}

fn run(args: &Args) -> Result<String, String> {
    let data =
        fs::read(&args.image_path).map_err(|e| format!("{}: {e}", args.image_path))?;
    let image = ObjImage::from_bytes(&data).map_err(|e| e.to_string())?;

    let mut lc3 = Lc3::new(args.config);
    lc3.load_image(&image).map_err(|e| e.to_string())?;
    lc3.queue_input(&args.input);

    let result = if args.ticked { lc3.run_tick() } else { lc3.run() };
    // Whatever made it to the display is worth showing even on a fault.
    let output = lc3.take_output();
    match result {
        Ok(()) => Ok(output),
        Err(e) => {
            if !output.is_empty() {
                print!("{output}");
            }
            Err(e.to_string())
        }
    }
}

fn main() {
    let args = parse_args();
    match run(&args) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("lc3-runner: {e}");
            process::exit(1);
        }
    }
}
