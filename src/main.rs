use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use fungus::exec::Interp;
use fungus::space::{Point, Space};

#[derive(Parser)]
#[command(name = "fungus", about = "A Befunge-98 interpreter")]
struct Cli {
    /// Befunge-98 source file.
    source: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let code = match fs::read(&cli.source) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fungus: {}: {e}", cli.source.display());
            process::exit(2);
        }
    };

    let mut space = Space::new();
    space.load(&code, Point::ORIGIN);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut interp = Interp::new(space, stdin.lock(), BufWriter::new(stdout.lock()));
    if let Err(stuck) = interp.run() {
        eprintln!("fungus: cursor infloops at ( {} {} )", stuck.pos.x, stuck.pos.y);
        process::exit(1);
    }
}
