use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "eblog", version, about = "Read a blog from the terminal with Emacs or Evil keys")]
struct Args {
    /// Directory of markdown posts, or a YAML index of links
    path: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start in Evil mode for this session without saving the choice
    #[arg(long)]
    evil: bool,

    /// Write the log here
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let options = eblog::RunOptions {
        posts: args.path,
        config_file: args.config,
        evil: args.evil,
        log_file: args.log,
    };
    if let Err(err) = eblog::run(options) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
